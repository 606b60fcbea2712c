//! Configuration inspection and reload.

use std::sync::Arc;

use serde_json::Value;

use cortexd_types::Request;

use crate::config_store::ConfigStore;
use crate::dispatch::errors::DispatchError;
use crate::dispatch::registry::Handler;

/// `config.get`: the current snapshot.
#[derive(Debug, Clone)]
pub struct GetConfig {
    store: Arc<ConfigStore>,
}

impl GetConfig {
    /// Creates the handler over the live store.
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Handler for GetConfig {
    fn execute(&self, _request: &Request) -> Result<Value, DispatchError> {
        let snapshot = self.store.snapshot();
        Ok(serde_json::to_value(snapshot.as_ref())?)
    }
}

/// `config.reload`: re-reads the remembered path and returns the adopted
/// snapshot.
///
/// A rejected document answers `invalid-argument`, an unreadable one `io`,
/// and a store with nothing to reload `unavailable`. In every failure case the
/// live configuration is unchanged.
#[derive(Debug, Clone)]
pub struct ReloadConfig {
    store: Arc<ConfigStore>,
}

impl ReloadConfig {
    /// Creates the handler over the live store.
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }
}

impl Handler for ReloadConfig {
    fn execute(&self, _request: &Request) -> Result<Value, DispatchError> {
        let adopted = self.store.reload()?;
        Ok(serde_json::to_value(adopted.as_ref())?)
    }
}
