//! Narrow interfaces to the components the dispatch core depends on.
//!
//! The monitor, alert manager and process control live outside this crate's
//! core. Handlers reach them only through the traits below, and every binding
//! is explicit: a collaborator that is not available at registration time is
//! [`Collaborator::Unbound`], and handlers that need it fail with an
//! `unavailable` error instead of touching a missing reference.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use cortexd_types::{Alert, AlertFilter, HealthSnapshot};

use crate::dispatch::DispatchError;

/// Source of health snapshots, typically the system monitor.
pub trait HealthMonitor: Send + Sync {
    /// Returns the most recent health snapshot.
    fn health_snapshot(&self) -> HealthSnapshot;
}

/// Thread-safe alert store.
pub trait AlertManager: Send + Sync {
    /// Returns the active alerts passing `filter`.
    fn active_alerts(&self, filter: &AlertFilter) -> Vec<Alert>;

    /// Marks the alert `id` as acknowledged.
    fn acknowledge(&self, id: &str) -> Result<(), AlertError>;

    /// Removes the alert `id` from the active set.
    fn dismiss(&self, id: &str) -> Result<(), AlertError>;
}

/// Errors reported by an [`AlertManager`].
#[derive(Debug, Error)]
pub enum AlertError {
    /// No alert with the given id exists.
    #[error("alert '{id}' not found")]
    NotFound { id: String },
    /// The alert store failed.
    #[error("alert store failure: {message}")]
    Store { message: String },
}

/// Process lifecycle control.
pub trait ProcessControl: Send + Sync {
    /// Asks the daemon to begin an orderly shutdown.
    fn request_shutdown(&self) -> Result<(), ShutdownRequestError>;
}

/// Error raised when a shutdown request cannot be delivered.
#[derive(Debug, Error)]
#[error("failed to signal shutdown: {message}")]
pub struct ShutdownRequestError {
    message: String,
}

impl ShutdownRequestError {
    /// Creates an error with a description of the failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Binding of an optional collaborator.
pub enum Collaborator<T: ?Sized> {
    /// The collaborator is available.
    Bound(Arc<T>),
    /// The collaborator is not available to this daemon instance.
    Unbound,
}

impl<T: ?Sized> Collaborator<T> {
    /// Binds an available collaborator.
    #[must_use]
    pub fn bound(collaborator: Arc<T>) -> Self {
        Self::Bound(collaborator)
    }

    /// Returns `true` when the collaborator is available.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Returns the collaborator, or an `unavailable` error naming it.
    pub fn require(&self, name: &'static str) -> Result<&T, DispatchError> {
        match self {
            Self::Bound(collaborator) => Ok(collaborator.as_ref()),
            Self::Unbound => Err(DispatchError::unavailable(name)),
        }
    }
}

impl<T: ?Sized> Clone for Collaborator<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Bound(collaborator) => Self::Bound(Arc::clone(collaborator)),
            Self::Unbound => Self::Unbound,
        }
    }
}

impl<T: ?Sized> Default for Collaborator<T> {
    fn default() -> Self {
        Self::Unbound
    }
}

impl<T: ?Sized> fmt::Debug for Collaborator<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound(_) => formatter.write_str("Bound"),
            Self::Unbound => formatter.write_str("Unbound"),
        }
    }
}

/// Collaborators handed to the handler registry at startup.
#[derive(Debug, Clone, Default)]
pub struct Collaborators {
    /// System monitor used by `health`.
    pub monitor: Collaborator<dyn HealthMonitor>,
    /// Alert manager used by the `alerts.*` methods.
    pub alerts: Collaborator<dyn AlertManager>,
    /// Process control used by `shutdown`.
    pub process: Collaborator<dyn ProcessControl>,
}
