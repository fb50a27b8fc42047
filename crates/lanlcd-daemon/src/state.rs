//! Application state management.

use anyhow::{Context, Result};
use lanlcd_hw::{DisplayCommand, SerialChannel};
use tracing::{debug, info};

use crate::config::SerialConfig;

/// Shared application state.
pub struct AppState {
    /// Channel to the display controller
    channel: SerialChannel,

    /// Serial device path, for logging
    device: String,
}

/// Outcome of a relayed display command.
#[derive(Debug)]
pub struct Relayed {
    /// Command as it was sent to the device
    pub sent: DisplayCommand,

    /// Reply line, if the device answered
    pub reply: Option<String>,
}

impl AppState {
    /// Opens the serial link and waits for the controller to boot.
    pub async fn open(config: &SerialConfig) -> Result<Self> {
        let channel = SerialChannel::open(&config.device, config.baud, config.timing())
            .with_context(|| format!("Failed to open serial port {}", config.device))?;

        // Opening the port resets most USB-serial boards.
        let boot = config.boot_delay();
        debug!("Waiting for controller boot ({:?})...", boot);
        tokio::time::sleep(boot).await;

        Ok(Self::with_channel(channel, &config.device))
    }

    /// Creates state around an existing channel.
    pub fn with_channel(channel: SerialChannel, device: &str) -> Self {
        Self {
            channel,
            device: device.to_string(),
        }
    }

    /// Returns the serial device path.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Normalizes colors and relays the command to the device.
    pub async fn relay(&self, command: &DisplayCommand) -> lanlcd_hw::Result<Relayed> {
        let sent = command.normalized();
        let reply = self.channel.exchange(&sent).await?;
        info!(
            "Relayed command to {} (reply: {})",
            self.device,
            reply.as_deref().unwrap_or("none")
        );
        Ok(Relayed { sent, reply })
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        debug!("Closing serial port {}", self.device);
    }
}
