use std::fs::DirBuilder;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{DEFAULT_SOCKET_BACKLOG, DEFAULT_SOCKET_PATH, DEFAULT_SOCKET_TIMEOUT_MS};

/// Declarative configuration for the daemon's Unix socket.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SocketSettings {
    /// Filesystem path of the Unix domain socket.
    pub path: Utf8PathBuf,
    /// Maximum number of pending connections.
    pub backlog: u32,
    /// Per-connection read and write timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            path: Utf8PathBuf::from(DEFAULT_SOCKET_PATH),
            backlog: DEFAULT_SOCKET_BACKLOG,
            timeout_ms: DEFAULT_SOCKET_TIMEOUT_MS,
        }
    }
}

impl SocketSettings {
    /// Ensures the socket's parent directory exists with restrictive permissions.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(parent) = self.path.parent().filter(|parent| !parent.as_str().is_empty())
        else {
            return Err(SocketPreparationError::MissingParent {
                path: self.path.clone(),
            });
        };

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }

        if let Err(source) = builder.create(parent.as_std_path())
            && source.kind() != std::io::ErrorKind::AlreadyExists
        {
            return Err(SocketPreparationError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            });
        }

        Ok(())
    }
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// The socket path has no parent directory.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent { path: Utf8PathBuf },
    /// Failed to create the socket directory.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepares_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/run/cortex.sock");
        let settings = SocketSettings {
            path: Utf8PathBuf::from_path_buf(path.clone()).expect("utf8 path"),
            ..SocketSettings::default()
        };

        settings.prepare_filesystem().expect("prepare socket directory");

        assert!(path.parent().is_some_and(std::path::Path::is_dir));
    }

    #[test]
    fn rejects_bare_socket_names() {
        let settings = SocketSettings {
            path: Utf8PathBuf::from("cortex.sock"),
            ..SocketSettings::default()
        };
        let error = settings
            .prepare_filesystem()
            .expect_err("bare name has no parent");
        assert!(matches!(error, SocketPreparationError::MissingParent { .. }));
    }
}
