//! Daemon bootstrap orchestration.
//!
//! Bootstrap wires the pieces every daemon instance needs before it can serve
//! requests: telemetry that follows the configured log level, the initial
//! configuration load, and the dispatcher with its standard handlers. A
//! configuration that cannot be loaded is not fatal; the daemon starts with
//! the compiled-in defaults and the failure is logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use cortexd_config::{DEFAULT_CONFIG_PATH, LogFormat};

use crate::collaborators::Collaborators;
use crate::config_store::ConfigStore;
use crate::dispatch::{Dispatcher, HandlerRegistry, RegistryError};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");

/// Start-up options taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Configuration file loaded at start-up and on reload.
    pub config_path: PathBuf,
    /// Output format of the global log subscriber.
    pub log_format: LogFormat,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            log_format: LogFormat::default(),
        }
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The handler registry could not be assembled.
    #[error("failed to register request handlers: {source}")]
    Registry {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Daemon {
    store: Arc<ConfigStore>,
    dispatcher: Arc<Dispatcher>,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// The live configuration store.
    pub fn store(&self) -> Arc<ConfigStore> {
        Arc::clone(&self.store)
    }

    /// The dispatcher serving client requests.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Handle to the global telemetry subscriber.
    pub fn telemetry(&self) -> &TelemetryHandle {
        &self.telemetry
    }
}

/// Bootstraps the daemon around `store` with the given collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when telemetry cannot be installed or the
/// handler registry cannot be built. Configuration failures are logged and
/// leave the store on its current snapshot.
pub fn bootstrap_with(
    store: Arc<ConfigStore>,
    options: &BootstrapOptions,
    collaborators: Collaborators,
) -> Result<Daemon, BootstrapError> {
    let telemetry = telemetry::initialise(&store.get(), options.log_format)
        .map_err(|source| BootstrapError::Telemetry { source })?;
    telemetry.follow(&store);

    info!(
        target: BOOTSTRAP_TARGET,
        config = %options.config_path.display(),
        "bootstrapping daemon"
    );
    load_initial(&store, &options.config_path);

    let registry = HandlerRegistry::standard(Arc::clone(&store), collaborators)
        .map_err(|source| BootstrapError::Registry { source })?;
    info!(
        target: BOOTSTRAP_TARGET,
        methods = registry.len(),
        "request handlers registered"
    );

    Ok(Daemon {
        store,
        dispatcher: Arc::new(Dispatcher::new(registry)),
        telemetry,
    })
}

fn load_initial(store: &ConfigStore, path: &Path) {
    if let Err(error) = store.load(path) {
        warn!(
            target: BOOTSTRAP_TARGET,
            config = %path.display(),
            error = %error,
            "starting with default configuration"
        );
    }
}
