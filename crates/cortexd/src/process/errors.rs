//! Defines the unified error surface for daemon launch and supervision.

use thiserror::Error;

use cortexd_config::SocketPreparationError;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Preparing the socket filesystem failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Underlying filesystem error.
        #[source]
        source: SocketPreparationError,
    },
    /// Installing the signal handlers failed.
    #[error("failed to install signal handling: {source}")]
    Signals {
        /// Underlying signal error.
        #[source]
        source: ShutdownError,
    },
    /// Bootstrapping the daemon failed.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Socket listener startup failed.
    #[error("daemon socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

impl From<SocketPreparationError> for LaunchError {
    fn from(source: SocketPreparationError) -> Self {
        Self::Socket { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Signals { source }
    }
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}
