//! Handlers for the methods every daemon registers at startup.
//!
//! Each handler is a small struct holding exactly the references it needs:
//! the configuration store, or one collaborator binding. Collaborators that
//! were not available at startup stay [`Collaborator::Unbound`] and the
//! handlers that depend on them answer `unavailable`.
//!
//! [`Collaborator::Unbound`]: crate::collaborators::Collaborator::Unbound

mod alerts;
mod config;
mod monitoring;
mod system;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use cortexd_types::{Request, methods};

use crate::collaborators::Collaborators;
use crate::config_store::ConfigStore;

use super::errors::DispatchError;
use super::registry::{HandlerRegistry, RegistryError};

pub use alerts::{AcknowledgeAlert, DismissAlert, ListAlerts};
pub use config::{GetConfig, ReloadConfig};
pub use monitoring::Health;
pub use system::{Ping, Shutdown, Version};

impl HandlerRegistry {
    /// Builds the registry holding every standard method.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if two standard handlers share a name.
    pub fn standard(
        store: Arc<ConfigStore>,
        collaborators: Collaborators,
    ) -> Result<Self, RegistryError> {
        let Collaborators {
            monitor,
            alerts,
            process,
        } = collaborators;

        let mut builder = Self::builder();
        builder
            .register(methods::PING, Ping)?
            .register(methods::VERSION, Version)?
            .register(methods::CONFIG_GET, GetConfig::new(Arc::clone(&store)))?
            .register(methods::CONFIG_RELOAD, ReloadConfig::new(store))?
            .register(methods::SHUTDOWN, Shutdown::new(process))?
            .register(methods::HEALTH, Health::new(monitor))?
            .register(methods::ALERTS_GET, ListAlerts::new(alerts.clone()))?
            .register(
                methods::ALERTS_ACKNOWLEDGE,
                AcknowledgeAlert::new(alerts.clone()),
            )?
            .register(methods::ALERTS_DISMISS, DismissAlert::new(alerts))?;
        Ok(builder.build())
    }
}

/// Decodes the request parameters into `T`, treating absent parameters as
/// `T::default()`.
fn optional_params<T>(method: &'static str, request: &Request) -> Result<T, DispatchError>
where
    T: DeserializeOwned + Default,
{
    if !request.has_params() {
        return Ok(T::default());
    }
    serde_json::from_value(request.params.clone())
        .map_err(|error| DispatchError::invalid_arguments(method, error.to_string()))
}

/// Decodes required request parameters into `T`.
fn required_params<T>(method: &'static str, request: &Request) -> Result<T, DispatchError>
where
    T: DeserializeOwned,
{
    if !request.has_params() {
        return Err(DispatchError::invalid_arguments(
            method,
            "parameters are required",
        ));
    }
    serde_json::from_value(request.params.clone())
        .map_err(|error| DispatchError::invalid_arguments(method, error.to_string()))
}
