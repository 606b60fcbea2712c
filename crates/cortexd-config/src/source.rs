//! Configuration sources.
//!
//! A source turns a named resource into a [`Config`] candidate. Sources only
//! read and parse; validation happens in [`Config::load_from`] so every source
//! is held to the same rules.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{Config, ValidationError};

/// Reads configuration candidates from a named resource.
pub trait ConfigSource: Send + Sync {
    /// Reads and parses the resource at `path`.
    fn read(&self, path: &Path) -> Result<Config, ConfigError>;
}

/// Source reading YAML documents from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFileSource;

impl ConfigSource for YamlFileSource {
    fn read(&self, path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_saphyr::from_str::<Config>(&contents).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })
    }
}

/// Errors raised while producing a configuration candidate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The resource could not be read.
    #[error("failed to read configuration '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The resource was read but is not a well-formed document.
    #[error("failed to parse configuration '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    /// The document parsed but violates a validation rule.
    #[error("invalid configuration '{}': {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    /// Path of the resource that produced the error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Invalid { path, .. } => {
                path.as_path()
            }
        }
    }

    /// Returns `true` when the resource itself could not be read.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

/// Expands a leading `~` to the current user's home directory.
///
/// Paths without a leading `~`, and all paths when the home directory cannot
/// be determined, are returned unchanged.
#[must_use]
pub fn expand_path(path: &str) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_owned();
    };
    if !(rest.is_empty() || rest.starts_with('/')) {
        return path.to_owned();
    }
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => path.to_owned(),
    }
}

/// Path counterpart of [`expand_path`]; non-UTF-8 paths are returned unchanged.
pub(crate) fn expand_file_path(path: &Path) -> PathBuf {
    path.to_str()
        .map_or_else(|| path.to_path_buf(), |text| PathBuf::from(expand_path(text)))
}
