//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `azerus.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use azerus_adapter_virtual::VirtualInputConfig;
use azerus_app::recovery::RecoveryConfig;
use azerus_domain::marker::{Marker, WEAPON_KNOCKED_OUT};
use azerus_domain::rate::ActionRate;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Periodic action loop.
    pub engine: EngineConfig,
    /// Recovery pacing and key bindings.
    pub recovery: RecoverySection,
    /// Watched game log.
    pub log_tail: LogTailConfig,
    /// Simulated input backend.
    pub input: InputConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `127.0.0.1`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Actions per second.
    pub rate: f64,
    /// Start the loop right after boot.
    pub autostart: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecoverySection {
    pub force_stop_deadline_ms: u64,
    pub settle_delay_ms: u64,
    pub open_delay_ms: u64,
    pub close_delay_ms: u64,
    pub assign_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogTailConfig {
    /// Log file to watch. The tail idles until one is set.
    pub path: Option<PathBuf>,
    pub marker: String,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Key that opens and closes the inventory.
    pub context_key: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Config {
    /// Load configuration from `azerus.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("azerus.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("AZERUS_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("AZERUS_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("AZERUS_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = lookup("AZERUS_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("AZERUS_LOG_PATH") {
            self.log_tail.path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("AZERUS_RATE") {
            if let Ok(rate) = val.parse() {
                self.engine.rate = rate;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.action_rate()?;
        self.marker()?;
        if self.log_tail.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "log_tail.poll_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.recovery.assign_key.is_empty() || self.input.context_key.is_empty() {
            return Err(ConfigError::Validation(
                "key bindings must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a non-positive rate.
    pub fn action_rate(&self) -> Result<ActionRate, ConfigError> {
        ActionRate::new(self.engine.rate).map_err(|err| ConfigError::Validation(err.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty marker.
    pub fn marker(&self) -> Result<Marker, ConfigError> {
        Marker::new(self.log_tail.marker.as_str())
            .map_err(|err| ConfigError::Validation(err.to_string()))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.log_tail.poll_interval_ms)
    }

    #[must_use]
    pub fn recovery_config(&self) -> RecoveryConfig {
        RecoveryConfig {
            force_stop_deadline: Duration::from_millis(self.recovery.force_stop_deadline_ms),
            settle_delay: Duration::from_millis(self.recovery.settle_delay_ms),
            open_delay: Duration::from_millis(self.recovery.open_delay_ms),
            close_delay: Duration::from_millis(self.recovery.close_delay_ms),
            assign_key: self.recovery.assign_key.clone(),
        }
    }

    #[must_use]
    pub fn input_config(&self) -> VirtualInputConfig {
        VirtualInputConfig {
            context_key: self.input.context_key.clone(),
            screen_width: self.input.screen_width,
            screen_height: self.input.screen_height,
            ..VirtualInputConfig::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "azerusd=info,azerus=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rate: ActionRate::DEFAULT.per_second(),
            autostart: false,
        }
    }
}

impl Default for RecoverySection {
    fn default() -> Self {
        Self {
            force_stop_deadline_ms: 3000,
            settle_delay_ms: 50,
            open_delay_ms: 220,
            close_delay_ms: 120,
            assign_key: "2".to_string(),
        }
    }
}

impl Default for LogTailConfig {
    fn default() -> Self {
        Self {
            path: None,
            marker: WEAPON_KNOCKED_OUT.to_string(),
            poll_interval_ms: 250,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            context_key: "q".to_string(),
            screen_width: 1920,
            screen_height: 1080,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
