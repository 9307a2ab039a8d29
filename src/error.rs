//! Error types for the safe-write subsystem.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving identities, writing files, or setting up
/// the ambient configuration.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl WriteError {
    /// Wrap an I/O error, mapping `NotFound` onto the dedicated variant.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            WriteError::NotFound { path }
        } else {
            WriteError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WriteError::NotFound { .. })
    }
}

impl From<config::ConfigError> for WriteError {
    fn from(err: config::ConfigError) -> Self {
        WriteError::ConfigError(err.to_string())
    }
}
