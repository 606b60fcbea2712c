//! Health reporting method.

use serde_json::Value;

use cortexd_types::Request;

use crate::collaborators::{Collaborator, HealthMonitor};
use crate::dispatch::errors::DispatchError;
use crate::dispatch::registry::Handler;

/// `health`: the monitor's latest snapshot.
#[derive(Debug, Clone)]
pub struct Health {
    monitor: Collaborator<dyn HealthMonitor>,
}

impl Health {
    /// Creates the handler over the health monitor.
    pub fn new(monitor: Collaborator<dyn HealthMonitor>) -> Self {
        Self { monitor }
    }
}

impl Handler for Health {
    fn execute(&self, _request: &Request) -> Result<Value, DispatchError> {
        let monitor = self.monitor.require("system monitor")?;
        Ok(serde_json::to_value(monitor.health_snapshot())?)
    }
}
