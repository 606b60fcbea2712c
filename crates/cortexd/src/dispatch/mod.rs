//! Request dispatch for the daemon.
//!
//! A [`Dispatcher`] resolves each request's method through an immutable
//! [`HandlerRegistry`], runs the bound [`Handler`], and turns the outcome into
//! exactly one protocol response. [`DispatchConnectionHandler`] plugs the
//! dispatcher into the socket transport.
//!
//! ## Protocol
//!
//! Clients send a single JSONL request line:
//!
//! ```json
//! {"method":"alerts.acknowledge","params":{"id":"cpu-high"}}
//! ```
//!
//! The daemon answers with a single JSONL response line, either a success
//! carrying the method's result or an error carrying its kind:
//!
//! ```json
//! {"status":"success","result":{"acknowledged":"cpu-high"}}
//! {"status":"error","error_kind":"not-found","message":"alert not found: cpu-high"}
//! ```

mod connection;
mod dispatcher;
mod errors;
mod handlers;
mod registry;
mod request;
mod response;

pub use self::connection::DispatchConnectionHandler;
pub use self::dispatcher::Dispatcher;
pub use self::errors::DispatchError;
pub use self::handlers::{
    AcknowledgeAlert, DismissAlert, GetConfig, Health, ListAlerts, Ping, ReloadConfig, Shutdown,
    Version,
};
pub use self::registry::{Handler, HandlerRegistry, RegistryBuilder, RegistryError};
#[cfg(test)]
pub(crate) use self::request::parse_request;
