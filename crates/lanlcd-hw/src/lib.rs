//! LAN LCD Hardware Library
//!
//! Provides the serial channel, display command model and RGB565 palette
//! for LCDs driven by a microcontroller that accepts line-delimited JSON
//! over UART.

pub mod channel;
pub mod command;
pub mod error;
pub mod palette;

pub use channel::{ExchangeTiming, SerialChannel, Transport};
pub use command::{CommandKey, DisplayCommand, Scalar};
pub use error::{Error, Result};
pub use palette::{NamedColor, PALETTE};

/// Default serial port of the display controller.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default UART baud rate of the display controller.
pub const DEFAULT_BAUD_RATE: u32 = 115200;
