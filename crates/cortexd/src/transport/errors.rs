//! Error types for socket listener operations.

use std::io;

use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to create unix socket for {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to bind unix listener at {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to listen on {path} with backlog {backlog}: {source}")]
    Listen {
        path: String,
        backlog: u32,
        #[source]
        source: io::Error,
    },
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[error("existing unix socket {path} is already in use")]
    InUse { path: String },
    #[error("unix socket path {path} is not a socket")]
    NotSocket { path: String },
    #[error("failed to read metadata for unix socket {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to connect to existing unix socket {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove stale unix socket {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("listener thread panicked")]
    ThreadPanic,
}
