//! Byte transports the serial channel can drive.

use crate::Result;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{ClearBuffer, SerialPort, SerialStream};

/// A bidirectional byte stream to the display controller.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {
    /// Drops any received bytes that have not been read yet.
    fn discard_input(&mut self) -> Result<()>;
}

impl Transport for SerialStream {
    fn discard_input(&mut self) -> Result<()> {
        self.clear(ClearBuffer::Input)?;
        Ok(())
    }
}
