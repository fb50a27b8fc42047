//! Configuration management.

use anyhow::{Context, Result};
use lanlcd_hw::ExchangeTiming;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server listen address (e.g., "0.0.0.0:8080")
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Serial link configuration
    #[serde(default)]
    pub serial: SerialConfig,
}

/// Serial link to the display controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial port path
    #[serde(default = "default_device")]
    pub device: String,

    /// Baud rate
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Reply read timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Pause after sending a command, in milliseconds
    #[serde(default = "default_settle")]
    pub settle: u64,

    /// Pause after opening the port while the controller boots, in milliseconds
    #[serde(default = "default_boot")]
    pub boot: u64,
}

impl SerialConfig {
    /// Returns the exchange timing for the serial channel.
    pub fn timing(&self) -> ExchangeTiming {
        ExchangeTiming {
            settle: Duration::from_millis(self.settle),
            read_timeout: Duration::from_millis(self.timeout),
        }
    }

    /// Returns the post-open boot delay.
    pub fn boot_delay(&self) -> Duration {
        Duration::from_millis(self.boot)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud: default_baud(),
            timeout: default_timeout(),
            settle: default_settle(),
            boot: default_boot(),
        }
    }
}

// Default value functions
fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_device() -> String {
    lanlcd_hw::DEFAULT_DEVICE.to_string()
}

fn default_baud() -> u32 {
    lanlcd_hw::DEFAULT_BAUD_RATE
}

fn default_timeout() -> u64 {
    1000
}

fn default_settle() -> u64 {
    500
}

fn default_boot() -> u64 {
    1000
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            serial: SerialConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.serial.device, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud, 115200);
        assert_eq!(config.serial.timing(), ExchangeTiming::default());
        assert_eq!(config.serial.boot_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_serial_section() {
        let config = Config::parse(
            r#"
            listen = "127.0.0.1:9000"

            [serial]
            device = "/dev/ttyACM0"
            settle = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(config.serial.device, "/dev/ttyACM0");
        assert_eq!(config.serial.baud, 115200);
        assert_eq!(config.serial.timing().settle, Duration::from_millis(250));
        assert_eq!(config.serial.timing().read_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::parse("listen = ").is_err());
        assert!(Config::parse("[serial]\nbaud = \"fast\"").is_err());
    }

    #[test]
    fn test_bundled_default_config() {
        let config = Config::parse(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
