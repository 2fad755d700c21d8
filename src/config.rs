//! Configuration file management for chainprobe.
//!
//! This module handles loading, parsing, and merging configuration from TOML
//! files and command-line arguments. Settings can be specified in multiple
//! places with clear precedence rules.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (chainprobe.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! listen = "0.0.0.0:8080"
//! connect_timeout_secs = 5
//! log_level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for chainprobe.
///
/// All fields are optional to support partial configuration and merging.
/// Missing values will be filled in by defaults or overridden by CLI
/// arguments.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Address and port the HTTP server listens on
    pub listen: Option<String>,
    /// Bound on the TCP connect phase of each probe, in seconds
    pub connect_timeout_secs: Option<u64>,
    /// Log level: trace, debug, info, warn, error
    pub log_level: Option<String>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Creates a configuration with sensible defaults.
    ///
    /// # Default Values
    ///
    /// - `listen`: "0.0.0.0:8080"
    /// - `connect_timeout_secs`: 5
    /// - `log_level`: "info"
    pub fn default() -> Self {
        Config {
            listen: Some("0.0.0.0:8080".to_string()),
            connect_timeout_secs: Some(5),
            log_level: Some("info".to_string()),
        }
    }

    /// Merges this configuration with another, prioritizing the other's
    /// values.
    ///
    /// For each field, if the `other` config has a value (Some), it
    /// overrides this config's value. If the `other` value is None, keeps
    /// the current value.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.listen.is_some() {
            self.listen = other.listen;
        }
        if other.connect_timeout_secs.is_some() {
            self.connect_timeout_secs = other.connect_timeout_secs;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self
    }

    /// Creates a Config from command-line arguments for merging.
    ///
    /// Only provided arguments (Some values) will override other
    /// configurations.
    pub fn from_cli_args(
        listen: Option<String>,
        connect_timeout_secs: Option<u64>,
        log_level: Option<String>,
    ) -> Self {
        Config {
            listen,
            connect_timeout_secs,
            log_level,
        }
    }

    /// Resolved connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(5))
    }

    /// Generates an example configuration file in TOML format.
    ///
    /// Useful for bootstrapping a new configuration file.
    pub fn example_toml() -> String {
        let example = Config {
            listen: Some("0.0.0.0:8080".to_string()),
            connect_timeout_secs: Some(5),
            log_level: Some("info".to_string()),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
