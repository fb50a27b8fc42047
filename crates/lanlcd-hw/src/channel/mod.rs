//! Serial channel module.
//!
//! Relays line-delimited JSON to the display controller over UART and
//! captures its single-line replies.

mod device;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod transport;

pub use device::{ExchangeTiming, SerialChannel};
pub use transport::Transport;
