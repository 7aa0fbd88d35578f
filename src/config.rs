//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! The `[serial]` section is lenient: each key is optional and a value of the
//! wrong type or outside its allowed set is ignored, keeping the previous
//! value. Every other section is validated and rejected when out of range.

use serde::de::Error;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use toml::{Table, Value};
use tracing::debug;

use crate::error::{DownlinkError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

impl StopBits {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(1) => Some(StopBits::One),
            Value::Integer(2) => Some(StopBits::Two),
            Value::Float(f) if *f == 1.0 => Some(StopBits::One),
            Value::Float(f) if *f == 1.5 => Some(StopBits::OnePointFive),
            Value::Float(f) if *f == 2.0 => Some(StopBits::Two),
            _ => None,
        }
    }

    fn to_value(self) -> Value {
        match self {
            StopBits::One => Value::Integer(1),
            StopBits::OnePointFive => Value::Float(1.5),
            StopBits::Two => Value::Integer(2),
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        })
    }
}

/// Parity checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
    Mark,
    Space,
}

impl Parity {
    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "None" | "N" => Some(Parity::None),
            "Even" | "E" => Some(Parity::Even),
            "Odd" | "O" => Some(Parity::Odd),
            "Mark" | "M" => Some(Parity::Mark),
            "Space" | "S" => Some(Parity::Space),
            _ => None,
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(from = "Table")]
pub struct SerialConfig {
    /// Port identifier, e.g. `/dev/ttyUSB0` or `COM2`
    pub port_name: String,

    pub baud_rate: u32,

    pub stop_bits: StopBits,

    pub parity: Parity,

    /// Data bits per character (5-8)
    pub byte_size: u8,

    /// Read timeout handed to the driver
    pub timeout_ms: u64,
}

// Default value functions
fn default_port_name() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_byte_size() -> u8 { 8 }
fn default_timeout_ms() -> u64 { 100 }

fn default_poll_interval_ms() -> u64 { 10 }

fn default_log_level() -> String { "info".to_string() }

fn default_simulator_port() -> String { "/dev/ttyUSB1".to_string() }
fn default_simulator_rate_hz() -> u32 { 10 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: default_port_name(),
            baud_rate: default_baud_rate(),
            stop_bits: StopBits::One,
            parity: Parity::None,
            byte_size: default_byte_size(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl From<Table> for SerialConfig {
    fn from(table: Table) -> Self {
        let mut config = Self::default();
        config.apply(&table);
        config
    }
}

impl SerialConfig {
    /// Apply settings from a table, ignoring anything invalid
    ///
    /// Unrecognized keys and values of the wrong type or outside their
    /// allowed set leave the current setting unchanged.
    pub fn apply(&mut self, table: &Table) {
        for (key, value) in table {
            let accepted = match key.as_str() {
                "port_name" => value
                    .as_str()
                    .map(|name| self.port_name = name.to_string())
                    .is_some(),
                "baud_rate" => value
                    .as_integer()
                    .filter(|&rate| rate > 0)
                    .and_then(|rate| u32::try_from(rate).ok())
                    .map(|rate| self.baud_rate = rate)
                    .is_some(),
                "stop_bits" => StopBits::from_value(value)
                    .map(|bits| self.stop_bits = bits)
                    .is_some(),
                "parity" => Parity::from_value(value)
                    .map(|parity| self.parity = parity)
                    .is_some(),
                "byte_size" => value
                    .as_integer()
                    .filter(|size| (5..=8).contains(size))
                    .map(|size| self.byte_size = size as u8)
                    .is_some(),
                "timeout_ms" => value
                    .as_integer()
                    .filter(|&ms| ms > 0)
                    .map(|ms| self.timeout_ms = ms as u64)
                    .is_some(),
                _ => false,
            };

            if !accepted {
                debug!("Ignoring serial setting {} = {}", key, value);
            }
        }
    }

    /// Current settings as a table, in the form [`Self::apply`] accepts
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.insert("port_name".into(), Value::String(self.port_name.clone()));
        table.insert("baud_rate".into(), Value::Integer(i64::from(self.baud_rate)));
        table.insert("stop_bits".into(), self.stop_bits.to_value());
        table.insert("parity".into(), Value::String(self.parity.to_string()));
        table.insert("byte_size".into(), Value::Integer(i64::from(self.byte_size)));
        table.insert("timeout_ms".into(), Value::Integer(self.timeout_ms as i64));
        table
    }
}

/// Decode loop configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollConfig {
    /// Period of the poll tick
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive (`RUST_LOG` still takes precedence)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write daily-rolling log files here
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

/// Simulator configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Port the simulator writes frames to
    #[serde(default = "default_simulator_port")]
    pub port_name: String,

    /// Frames per second
    #[serde(default = "default_simulator_rate_hz")]
    pub rate_hz: u32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            port_name: default_simulator_port(),
            rate_hz: default_simulator_rate_hz(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iliad_downlink::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any non-serial value is out of its valid range
    fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 || self.poll.interval_ms > 10000 {
            return Err(DownlinkError::Config(
                toml::de::Error::custom("poll interval_ms must be between 1 and 10000")
            ));
        }

        if !["trace", "debug", "info", "warn", "error"]
            .contains(&self.logging.level.to_ascii_lowercase().as_str())
        {
            return Err(DownlinkError::Config(
                toml::de::Error::custom("logging level must be one of: trace, debug, info, warn, error")
            ));
        }

        if matches!(self.logging.log_dir.as_deref(), Some("")) {
            return Err(DownlinkError::Config(
                toml::de::Error::custom("logging log_dir cannot be empty when set")
            ));
        }

        if self.simulator.port_name.is_empty() {
            return Err(DownlinkError::Config(
                toml::de::Error::custom("simulator port_name cannot be empty")
            ));
        }

        if self.simulator.rate_hz == 0 || self.simulator.rate_hz > 1000 {
            return Err(DownlinkError::Config(
                toml::de::Error::custom("simulator rate_hz must be between 1 and 1000")
            ));
        }

        Ok(())
    }
}
