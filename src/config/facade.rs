//! ConfigLoader facade delegating to the merge service.

use super::merge::service::MergeService;
use super::SafeWriteConfig;
use crate::error::WriteError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<SafeWriteConfig, WriteError> {
        MergeService::load().map_err(WriteError::from)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<SafeWriteConfig, WriteError> {
        MergeService::load_from_file(path).map_err(WriteError::from)
    }

    /// Load from `path` when given, otherwise from the standard sources.
    pub fn load_or_default_sources(path: Option<&Path>) -> Result<SafeWriteConfig, WriteError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }
}
