//! Error types for the LAN LCD hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building commands or talking to the device.
#[derive(Error, Debug)]
pub enum Error {
    /// Serial device path does not exist.
    #[error("Serial device not found at {0}")]
    DeviceNotFound(String),

    /// Serial port communication error.
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Serial I/O error.
    #[error("Serial I/O error: {0}")]
    SerialIo(#[from] std::io::Error),

    /// Command could not be encoded for the wire.
    #[error("Failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    /// Query string carried none of the recognized keys.
    #[error("No parameters provided")]
    NoParameters,

    /// Request body is missing, empty, not JSON, or not a JSON object.
    #[error("Invalid or missing JSON body")]
    InvalidBody,

    /// JSON body carried a key outside the recognized set.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// JSON body carried an array or object where a scalar was expected.
    #[error("Invalid value for key: {0}")]
    InvalidValue(String),
}

impl Error {
    /// Returns true if the error came from the serial link itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::DeviceNotFound(_) | Error::Serial(_) | Error::SerialIo(_)
        )
    }

    /// Returns true if the error was caused by malformed client input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoParameters
                | Error::InvalidBody
                | Error::UnknownKey(_)
                | Error::InvalidValue(_)
        )
    }
}
