//! Per-request routing from method name to handler.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error, warn};

use cortexd_types::{ErrorKind, Request, Response};

use crate::config_store::panic_message;

use super::errors::DispatchError;
use super::registry::HandlerRegistry;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes requests through an immutable [`HandlerRegistry`].
///
/// Every call to [`Dispatcher::handle`] produces exactly one [`Response`]:
/// lookup failures, handler errors and handler panics all become error
/// responses, so a single bad request never takes the connection down.
#[derive(Debug)]
pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over a fully built registry.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    /// The registry requests are routed through.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Executes `request` and converts the outcome into a response.
    pub fn handle(&self, request: &Request) -> Response {
        match self.execute(request) {
            Ok(result) => Response::success(result),
            Err(error) => {
                let kind = error.kind();
                if kind == ErrorKind::Internal {
                    error!(
                        target: DISPATCH_TARGET,
                        method = request.method(),
                        error = %error,
                        "request failed"
                    );
                } else {
                    warn!(
                        target: DISPATCH_TARGET,
                        method = request.method(),
                        kind = %kind,
                        error = %error,
                        "request rejected"
                    );
                }
                error.to_response()
            }
        }
    }

    fn execute(&self, request: &Request) -> Result<Value, DispatchError> {
        let method = request.method();
        if method.is_empty() {
            return Err(DispatchError::EmptyMethod);
        }
        let handler = self
            .registry
            .get(method)
            .ok_or_else(|| DispatchError::unknown_method(method))?;

        debug!(target: DISPATCH_TARGET, method, "dispatching request");
        panic::catch_unwind(AssertUnwindSafe(|| handler.execute(request))).unwrap_or_else(
            |payload| {
                Err(DispatchError::internal(format!(
                    "handler for '{method}' panicked: {}",
                    panic_message(payload.as_ref())
                )))
            },
        )
    }
}
