//! # Status Display Configuration
//!
//! Settings are read from a TOML file. Every key has a default, so an empty
//! file yields the stock rotation.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [status]
//! messages = ["{completion:.2f}% complete", "ETL {printTimeLeft}", "Layer {currentLayer}/{totalLayer}"]
//! eta_strftime = "%H:%M:%S %dth %b"
//! etl_format = "{hours:02d}:{minutes:02d}:{seconds:02d}"
//! time_to_change = 6
//!
//! [simulation]
//! print_seconds = 600
//! layers = 120
//! ```
//!
//! Message placeholders: `completion`, `printTimeLeft`, `ETA`, `accuracy`,
//! `currentLayer`, `totalLayer`. ETL placeholders: `hours`, `minutes`,
//! `seconds`. The ETA pattern uses strftime specifiers.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigurationError),
}

/// A configuration that parses but cannot drive a print session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no status messages configured")]
    NoMessages,
    #[error("time_to_change must be greater than zero")]
    ZeroInterval,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// What the display rotates through and how often.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatusConfig {
    #[serde(default = "default_messages")]
    pub messages: Vec<String>,
    #[serde(default = "default_eta_strftime")]
    pub eta_strftime: String,
    #[serde(default = "default_etl_format")]
    pub etl_format: String,
    /// Seconds between display updates.
    #[serde(default = "default_time_to_change")]
    pub time_to_change: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            messages: default_messages(),
            eta_strftime: default_eta_strftime(),
            etl_format: default_etl_format(),
            time_to_change: default_time_to_change(),
        }
    }
}

impl StatusConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.messages.is_empty() {
            return Err(ConfigurationError::NoMessages);
        }
        if self.time_to_change == 0 {
            return Err(ConfigurationError::ZeroInterval);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.time_to_change)
    }
}

/// Parameters for the built-in simulated printer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default = "default_print_seconds")]
    pub print_seconds: u64,
    #[serde(default = "default_layers")]
    pub layers: u32,
    /// Simulated print seconds per wall-clock second.
    #[serde(default = "default_speedup")]
    pub speedup: f64,
    /// Whether the simulated printer emits layer-changed events.
    #[serde(default = "default_layer_info")]
    pub layer_info: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            print_seconds: default_print_seconds(),
            layers: default_layers(),
            speedup: default_speedup(),
            layer_info: default_layer_info(),
        }
    }
}

// Default value functions
fn default_messages() -> Vec<String> {
    vec![
        "{completion:.2f}% complete".to_string(),
        "ETL {printTimeLeft}".to_string(),
        "ETA {ETA}".to_string(),
        "Layer {currentLayer}/{totalLayer}".to_string(),
        "Accuracy: {accuracy}".to_string(),
    ]
}
fn default_eta_strftime() -> String { "%H:%M:%S %dth %b".to_string() }
fn default_etl_format() -> String { "{hours:02d}:{minutes:02d}:{seconds:02d}".to_string() }
fn default_time_to_change() -> u64 { 6 }
fn default_print_seconds() -> u64 { 600 }
fn default_layers() -> u32 { 120 }
fn default_speedup() -> f64 { 20.0 }
fn default_layer_info() -> bool { true }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path.display(), e);
            Err(ConfigError::Io(e))
        }
    }
}

/// Where a print session gets its status settings from.
///
/// Settings are fetched once per print start, so edits take effect on the
/// next print without restarting.
pub trait SettingsSource: Send + Sync {
    fn load_status(&self) -> Result<StatusConfig, ConfigError>;
}

/// Re-reads the `[status]` section of a TOML file on every print start.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsSource for FileSettings {
    fn load_status(&self) -> Result<StatusConfig, ConfigError> {
        Ok(load_config(&self.path)?.status)
    }
}

/// Fixed settings, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub StatusConfig);

impl SettingsSource for StaticSettings {
    fn load_status(&self) -> Result<StatusConfig, ConfigError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.status.messages.len(), 5);
        assert_eq!(config.status.messages[3], "Layer {currentLayer}/{totalLayer}");
        assert_eq!(config.status.eta_strftime, "%H:%M:%S %dth %b");
        assert_eq!(config.status.etl_format, "{hours:02d}:{minutes:02d}:{seconds:02d}");
        assert_eq!(config.status.time_to_change, 6);
        assert_eq!(config.status.tick_interval(), Duration::from_secs(6));
        assert!(config.status.validate().is_ok());
    }

    #[test]
    fn test_load_config_success() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("status.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[status]\nmessages = ['{{completion:.2f}}% done', 'ETL {{printTimeLeft}}']\ntime_to_change = 10").unwrap();
        file.flush().unwrap();
        let config = load_config(&file_path).unwrap();
        assert_eq!(config.status.messages, vec!["{completion:.2f}% done", "ETL {printTimeLeft}"]);
        assert_eq!(config.status.time_to_change, 10);
        // Defaults for missing fields
        assert_eq!(config.status.etl_format, "{hours:02d}:{minutes:02d}:{seconds:02d}");
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent_file.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not a valid toml").unwrap();
        file.flush().unwrap();
        let result = load_config(&file_path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_validate_rejects_degenerate_settings() {
        let empty = StatusConfig { messages: Vec::new(), ..StatusConfig::default() };
        assert_eq!(empty.validate(), Err(ConfigurationError::NoMessages));
        let zero = StatusConfig { time_to_change: 0, ..StatusConfig::default() };
        assert_eq!(zero.validate(), Err(ConfigurationError::ZeroInterval));
    }

    #[test]
    fn test_file_settings_rereads_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("status.toml");
        std::fs::write(&file_path, "[status]\ntime_to_change = 3\n").unwrap();
        let settings = FileSettings::new(&file_path);
        assert_eq!(settings.load_status().unwrap().time_to_change, 3);
        std::fs::write(&file_path, "[status]\ntime_to_change = 9\n").unwrap();
        assert_eq!(settings.load_status().unwrap().time_to_change, 9);
    }
}
