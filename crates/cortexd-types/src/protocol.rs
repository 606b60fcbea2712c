//! Request and response envelopes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request sent by a client.
///
/// `params` is method-defined and may be omitted entirely.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Request {
    /// Method name, for example `config.get`.
    pub method: String,
    /// Method-specific parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Request {
    /// Builds a request without parameters.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Value::Null,
        }
    }

    /// Builds a request carrying `params`.
    #[must_use]
    pub fn with_params(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Returns the method name with surrounding whitespace removed.
    #[must_use]
    pub fn method(&self) -> &str {
        self.method.trim()
    }

    /// Returns `true` when the request carries no parameters.
    #[must_use]
    pub fn has_params(&self) -> bool {
        !self.params.is_null()
    }
}

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Unknown method or unknown entity id.
    NotFound,
    /// A required collaborator is not available.
    Unavailable,
    /// Malformed parameters or a rejected configuration.
    InvalidArgument,
    /// Unexpected failure inside the daemon.
    Internal,
    /// The configuration source could not be read.
    Io,
}

impl ErrorKind {
    /// Wire representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::Unavailable => "unavailable",
            Self::InvalidArgument => "invalid-argument",
            Self::Internal => "internal",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Response returned for every request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// The method completed.
    Success {
        /// Method-defined result payload.
        result: Value,
    },
    /// The method failed.
    Error {
        /// Failure category.
        error_kind: ErrorKind,
        /// Human-readable description.
        message: String,
    },
}

impl Response {
    /// Builds a success response.
    #[must_use]
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    /// Builds an error response.
    #[must_use]
    pub fn error(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            error_kind,
            message: message.into(),
        }
    }

    /// Returns `true` for success responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the error kind of an error response.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Error { error_kind, .. } => Some(*error_kind),
        }
    }

    /// Returns the result payload of a success response.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Success { result } => Some(result),
            Self::Error { .. } => None,
        }
    }

    /// Returns the message of an error response.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Error { message, .. } => Some(message.as_str()),
        }
    }
}
