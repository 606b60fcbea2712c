//! Error types for request dispatch failures.
//!
//! Every failure a request can run into, from a malformed line on the wire to
//! a collaborator rejecting an operation, is a [`DispatchError`]. Each variant
//! maps onto exactly one protocol [`ErrorKind`], which is what the client sees
//! alongside the rendered message.

use std::io;

use thiserror::Error;

use cortexd_types::{ErrorKind, Response};

use crate::collaborators::{AlertError, ShutdownRequestError};
use crate::config_store::ConfigStoreError;

/// Errors surfaced during request parsing and dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line could not be parsed as a request envelope.
    #[error("malformed request: {message}")]
    MalformedRequest {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },

    /// Request named no method.
    #[error("request method is empty")]
    EmptyMethod,

    /// No handler is registered for the method.
    #[error("unknown method: {method}")]
    UnknownMethod { method: String },

    /// Parameters are missing or malformed.
    #[error("invalid arguments for {method}: {message}")]
    InvalidArguments {
        method: &'static str,
        message: String,
    },

    /// A collaborator the method needs is not bound.
    #[error("{collaborator} is not available")]
    Unavailable { collaborator: &'static str },

    /// The connection exceeded its request budget.
    #[error("rate limit exceeded: at most {limit} requests per second")]
    RateLimited { limit: u32 },

    /// The alert manager has no alert with this id.
    #[error("alert not found: {id}")]
    AlertNotFound { id: String },

    /// The alert manager failed for another reason.
    #[error("alert manager failed: {message}")]
    AlertStore { message: String },

    /// The configuration store refused a reload.
    #[error("configuration reload failed: {0}")]
    ConfigReload(#[source] ConfigStoreError),

    /// Process control could not deliver the shutdown request.
    #[error(transparent)]
    Shutdown(#[from] ShutdownRequestError),

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response serialization failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),

    /// Unexpected failure, including a handler panic.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DispatchError {
    /// Protocol error kind reported to the client.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRequest { .. }
            | Self::RequestTooLarge { .. }
            | Self::EmptyMethod
            | Self::InvalidArguments { .. } => ErrorKind::InvalidArgument,
            Self::UnknownMethod { .. } | Self::AlertNotFound { .. } => ErrorKind::NotFound,
            Self::Unavailable { .. } | Self::RateLimited { .. } => ErrorKind::Unavailable,
            Self::ConfigReload(error) => reload_kind(error),
            Self::Io(_) => ErrorKind::Io,
            Self::AlertStore { .. }
            | Self::Shutdown(_)
            | Self::SerializeResponse(_)
            | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Renders the error as a protocol response.
    pub fn to_response(&self) -> Response {
        Response::error(self.kind(), self.to_string())
    }

    /// Creates a malformed request error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }

    /// Creates an unknown method error.
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Creates an invalid arguments error for `method`.
    pub fn invalid_arguments(method: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            method,
            message: message.into(),
        }
    }

    /// Creates an unavailable collaborator error.
    pub fn unavailable(collaborator: &'static str) -> Self {
        Self::Unavailable { collaborator }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

fn reload_kind(error: &ConfigStoreError) -> ErrorKind {
    match error {
        ConfigStoreError::NoSourcePath | ConfigStoreError::PathChanged { .. } => {
            ErrorKind::Unavailable
        }
        ConfigStoreError::Source(source) if source.is_io() => ErrorKind::Io,
        ConfigStoreError::Source(_) => ErrorKind::InvalidArgument,
    }
}

impl From<AlertError> for DispatchError {
    fn from(error: AlertError) -> Self {
        match error {
            AlertError::NotFound { id } => Self::AlertNotFound { id },
            AlertError::Store { message } => Self::AlertStore { message },
        }
    }
}

impl From<ConfigStoreError> for DispatchError {
    fn from(error: ConfigStoreError) -> Self {
        Self::ConfigReload(error)
    }
}
