use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, FromRepr};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Daemon log verbosity as stored in the `log_level` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, FromRepr, Display)]
#[repr(u8)]
#[strum(serialize_all = "snake_case")]
pub enum LogLevel {
    /// Everything, including per-request tracing.
    Debug = 0,
    /// Lifecycle events and configuration changes.
    #[default]
    Info = 1,
    /// Recoverable problems.
    Warn = 2,
    /// Failures that affect a request or subsystem.
    Error = 3,
    /// Only failures that threaten the daemon itself.
    Critical = 4,
}

impl LogLevel {
    /// Highest accepted raw level.
    pub const MAX: u8 = Self::Critical as u8;

    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    ///
    /// `tracing` has no level above `error`, so critical maps onto it.
    #[must_use]
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}
