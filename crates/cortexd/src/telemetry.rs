//! Structured telemetry initialisation for the daemon.
//!
//! The global subscriber's level filter sits behind a reload layer so the
//! `log_level` of every newly adopted configuration takes effect without
//! reinstalling the subscriber. When `RUST_LOG` is set it wins, and
//! configuration changes leave the filter alone.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{debug, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, reload};

use cortexd_config::{Config, LogFormat};

use crate::config_store::{ConfigStore, SubscriptionId};

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

static TELEMETRY: OnceCell<TelemetryHandle> = OnceCell::new();

type FilterHandle = reload::Handle<EnvFilter, Registry>;
type Filtered = Layered<reload::Layer<EnvFilter, Registry>, Registry>;

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Clone)]
pub struct TelemetryHandle {
    filter: FilterHandle,
    env_override: bool,
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
    /// Failed to swap the active filter.
    #[error("failed to update log filter: {0}")]
    Reload(String),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber and later ones return a clone of the same handle.
pub fn initialise(config: &Config, format: LogFormat) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY
        .get_or_try_init(|| install_subscriber(config, format))
        .cloned()
}

fn install_subscriber(config: &Config, format: LogFormat) -> Result<TelemetryHandle, TelemetryError> {
    let (filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (configured_filter(config)?, false),
    };
    let (filter_layer, filter_handle) = reload::Layer::new(filter);

    let output = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());
    let output: Box<dyn Layer<Filtered> + Send + Sync> = match format {
        LogFormat::Json => output.json().flatten_event(true).boxed(),
        LogFormat::Compact => output.compact().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter_layer).with(output);
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
    Ok(TelemetryHandle {
        filter: filter_handle,
        env_override,
    })
}

fn configured_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter(error.to_string()))
}

impl TelemetryHandle {
    /// Returns `true` when `RUST_LOG` pinned the filter at start-up.
    pub fn env_override(&self) -> bool {
        self.env_override
    }

    /// Applies the log level of `config` to the active filter.
    pub fn apply(&self, config: &Config) -> Result<(), TelemetryError> {
        if self.env_override {
            debug!(target: TELEMETRY_TARGET, "RUST_LOG is set; keeping log filter");
            return Ok(());
        }
        let filter = configured_filter(config)?;
        self.filter
            .reload(filter)
            .map_err(|error| TelemetryError::Reload(error.to_string()))?;
        debug!(
            target: TELEMETRY_TARGET,
            filter = config.log_filter(),
            "log filter updated"
        );
        Ok(())
    }

    /// Re-applies the log level whenever `store` adopts a configuration.
    pub fn follow(&self, store: &ConfigStore) -> SubscriptionId {
        let handle = self.clone();
        store.subscribe(move |config| {
            handle.apply(config).map_err(|error| {
                warn!(target: TELEMETRY_TARGET, %error, "log level not applied");
                error.into()
            })
        })
    }
}
