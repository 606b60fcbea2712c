//! Shared configuration model for the cortex monitoring daemon.
//!
//! The daemon reads a single configuration document at startup and may re-read
//! it at any time while serving requests. This crate owns the value type that
//! document deserializes into, the compiled-in defaults used when no document
//! is available, and the validation rules every candidate must pass before the
//! daemon is allowed to adopt it.
//!
//! Reading the document is delegated to a [`ConfigSource`]. The default
//! [`YamlFileSource`] understands the layout below; every key is optional and
//! falls back to its default.
//!
//! ```yaml
//! socket:
//!   path: /run/cortex/cortex.sock
//!   backlog: 16
//!   timeout_ms: 5000
//! rate_limit:
//!   max_requests_per_sec: 100
//! log_level: 1
//! monitoring:
//!   cpu: { warning_threshold: 70, critical_threshold: 90 }
//!   memory: { warning_threshold: 80, critical_threshold: 95 }
//!   disk: { warning_threshold: 80, critical_threshold: 95 }
//!   check_interval_seconds: 60
//! ```

mod defaults;
mod logging;
mod monitoring;
mod socket;
mod source;
mod validation;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CHECK_INTERVAL_SECONDS, DEFAULT_CONFIG_PATH, DEFAULT_LOG_LEVEL,
    DEFAULT_MAX_REQUESTS_PER_SEC, DEFAULT_SOCKET_BACKLOG, DEFAULT_SOCKET_PATH,
    DEFAULT_SOCKET_TIMEOUT_MS,
};
pub use logging::{LogFormat, LogFormatParseError, LogLevel};
pub use monitoring::{MonitoringSettings, Thresholds};
pub use socket::{SocketPreparationError, SocketSettings};
pub use source::{ConfigError, ConfigSource, YamlFileSource, expand_path};
use source::expand_file_path;
pub use validation::{Resource, ValidationError};

/// Complete daemon configuration.
///
/// Values are immutable once adopted by the daemon; a reload replaces the
/// whole value rather than editing fields in place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Listener settings consumed by the transport.
    pub socket: SocketSettings,
    /// Request admission settings consumed by the transport.
    pub rate_limit: RateLimitSettings,
    /// Log verbosity from 0 (debug) to 4 (critical).
    pub log_level: u8,
    /// Resource thresholds and sampling cadence for the system monitor.
    pub monitoring: MonitoringSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: SocketSettings::default(),
            rate_limit: RateLimitSettings::default(),
            log_level: DEFAULT_LOG_LEVEL,
            monitoring: MonitoringSettings::default(),
        }
    }
}

impl Config {
    /// Reads `path` through `source`, expands paths, and validates the result.
    ///
    /// A leading `~` in `path` is expanded before the source is read. A
    /// candidate is returned only when it passes every rule; otherwise the
    /// first violated rule is reported and nothing is produced.
    pub fn load_from(source: &dyn ConfigSource, path: &Path) -> Result<Self, ConfigError> {
        let path = expand_file_path(path);
        let mut config = source.read(&path)?;
        config.expand_paths();
        config
            .validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(config)
    }

    /// Checks the configuration against the daemon's validation rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }

    /// Expands a leading `~` in the socket path to the home directory.
    pub fn expand_paths(&mut self) {
        self.socket.path = expand_path(self.socket.path.as_str()).into();
    }

    /// Socket read and write timeout as a [`Duration`].
    #[must_use]
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket.timeout_ms)
    }

    /// Interval between monitor sampling passes.
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring.check_interval_seconds)
    }

    /// Verbosity level, or `None` when the raw value is out of range.
    #[must_use]
    pub fn level(&self) -> Option<LogLevel> {
        LogLevel::from_repr(self.log_level)
    }

    /// Tracing filter directive matching the configured verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        self.level().unwrap_or_default().filter_directive()
    }
}

/// Request admission limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Requests admitted per one-second window.
    pub max_requests_per_sec: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests_per_sec: DEFAULT_MAX_REQUESTS_PER_SEC,
        }
    }
}
