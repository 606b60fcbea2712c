//! Alert listing and lifecycle.
//!
//! All three handlers check the alert manager binding before looking at the
//! parameters, so an unbound manager always answers `unavailable`.

use serde_json::{Value, json};

use cortexd_types::{AlertFilter, AlertTarget, Request, methods};

use crate::collaborators::{AlertManager, Collaborator};
use crate::dispatch::errors::DispatchError;
use crate::dispatch::registry::Handler;

use super::{optional_params, required_params};

const ALERT_MANAGER: &str = "alert manager";

/// `alerts.get`: active alerts, optionally filtered.
#[derive(Debug, Clone)]
pub struct ListAlerts {
    alerts: Collaborator<dyn AlertManager>,
}

impl ListAlerts {
    /// Creates the handler over the alert manager.
    pub fn new(alerts: Collaborator<dyn AlertManager>) -> Self {
        Self { alerts }
    }
}

impl Handler for ListAlerts {
    fn execute(&self, request: &Request) -> Result<Value, DispatchError> {
        let alerts = self.alerts.require(ALERT_MANAGER)?;
        let filter: AlertFilter = optional_params(methods::ALERTS_GET, request)?;
        let active = alerts.active_alerts(&filter);
        Ok(json!({
            "count": active.len(),
            "alerts": active,
        }))
    }
}

/// `alerts.acknowledge`: marks one alert as seen.
#[derive(Debug, Clone)]
pub struct AcknowledgeAlert {
    alerts: Collaborator<dyn AlertManager>,
}

impl AcknowledgeAlert {
    /// Creates the handler over the alert manager.
    pub fn new(alerts: Collaborator<dyn AlertManager>) -> Self {
        Self { alerts }
    }
}

impl Handler for AcknowledgeAlert {
    fn execute(&self, request: &Request) -> Result<Value, DispatchError> {
        let alerts = self.alerts.require(ALERT_MANAGER)?;
        let target = alert_target(methods::ALERTS_ACKNOWLEDGE, request)?;
        alerts.acknowledge(&target.id)?;
        Ok(json!({ "acknowledged": target.id }))
    }
}

/// `alerts.dismiss`: removes one alert from the active set.
#[derive(Debug, Clone)]
pub struct DismissAlert {
    alerts: Collaborator<dyn AlertManager>,
}

impl DismissAlert {
    /// Creates the handler over the alert manager.
    pub fn new(alerts: Collaborator<dyn AlertManager>) -> Self {
        Self { alerts }
    }
}

impl Handler for DismissAlert {
    fn execute(&self, request: &Request) -> Result<Value, DispatchError> {
        let alerts = self.alerts.require(ALERT_MANAGER)?;
        let target = alert_target(methods::ALERTS_DISMISS, request)?;
        alerts.dismiss(&target.id)?;
        Ok(json!({ "dismissed": target.id }))
    }
}

fn alert_target(method: &'static str, request: &Request) -> Result<AlertTarget, DispatchError> {
    let target: AlertTarget = required_params(method, request)?;
    if target.id.trim().is_empty() {
        return Err(DispatchError::invalid_arguments(method, "alert id is empty"));
    }
    Ok(target)
}
