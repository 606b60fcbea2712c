//! Core of the cortex system daemon.
//!
//! The daemon holds a live, validated configuration and answers single-line
//! JSON requests over a Unix domain socket. Each connection carries one
//! request and receives one response; see [`dispatch`] for the wire protocol
//! and the method table.
//!
//! Configuration lives in the [`ConfigStore`]. It is loaded once at start-up,
//! re-read on `SIGHUP` or the `config.reload` method, and every adopted
//! snapshot is announced to subscribers. A candidate that fails to parse or
//! validate never replaces the current snapshot.
//!
//! Monitoring, alerting and process control are supplied by collaborators
//! behind the traits in this crate. Methods whose collaborator is not bound
//! answer with the `unavailable` error kind rather than failing the daemon.

mod bootstrap;
mod collaborators;
mod config_store;
pub mod dispatch;
mod process;
mod telemetry;
mod transport;

pub use bootstrap::{BootstrapError, BootstrapOptions, Daemon, bootstrap_with};
pub use collaborators::{
    AlertError, AlertManager, Collaborator, Collaborators, HealthMonitor, ProcessControl,
    ShutdownRequestError,
};
pub use config_store::{ConfigStore, ConfigStoreError, SubscriberError, SubscriptionId};
pub use process::{
    LaunchError, ShutdownError, SignalLoop, SignalProcessControl, StopReason, run_daemon,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionHandler, ListenerError, ListenerHandle, SocketListener};

#[cfg(test)]
mod tests;
