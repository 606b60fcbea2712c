//! Liveness, build identification and shutdown.

use serde_json::{Value, json};
use tracing::info;

use cortexd_types::{Request, methods};

use crate::collaborators::{Collaborator, ProcessControl};
use crate::dispatch::dispatcher::DISPATCH_TARGET;
use crate::dispatch::errors::DispatchError;
use crate::dispatch::registry::Handler;

/// `ping`: fixed acknowledgement, whatever the parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ping;

impl Handler for Ping {
    fn execute(&self, _request: &Request) -> Result<Value, DispatchError> {
        Ok(json!({ "pong": true }))
    }
}

/// `version`: package name and version baked in at build time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Version;

impl Handler for Version {
    fn execute(&self, _request: &Request) -> Result<Value, DispatchError> {
        Ok(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }
}

/// `shutdown`: asks process control to stop the daemon.
#[derive(Debug, Clone)]
pub struct Shutdown {
    process: Collaborator<dyn ProcessControl>,
}

impl Shutdown {
    /// Creates the handler over process control.
    pub fn new(process: Collaborator<dyn ProcessControl>) -> Self {
        Self { process }
    }
}

impl Handler for Shutdown {
    fn execute(&self, _request: &Request) -> Result<Value, DispatchError> {
        let process = self.process.require("process control")?;
        process.request_shutdown()?;
        info!(
            target: DISPATCH_TARGET,
            method = methods::SHUTDOWN,
            "shutdown requested by client"
        );
        Ok(json!({ "shutting_down": true }))
    }
}
