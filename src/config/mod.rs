//! Configuration
//!
//! Layered configuration for the safe-write subsystem, built with the
//! `config` crate. Precedence from lowest to highest: built-in defaults,
//! global file (or an explicit file), `SAFEWRITE_*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::WriteError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafeWriteConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cache file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory; None means the per-user platform cache directory
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Record a content fingerprint of the source next to each cache entry
    #[serde(default = "default_fingerprint")]
    pub fingerprint: bool,
}

fn default_fingerprint() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            fingerprint: default_fingerprint(),
        }
    }
}

impl CacheConfig {
    /// Resolve the directory cache files live in.
    pub fn resolve_dir(&self) -> Result<PathBuf, WriteError> {
        match &self.dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.clone()),
            _ => xdg::default_cache_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_config() {
        let config = CacheConfig::default();
        assert_eq!(config.dir, None);
        assert!(config.fingerprint);
    }

    #[test]
    fn test_explicit_cache_dir_wins() {
        let config = CacheConfig {
            dir: Some(PathBuf::from("/tmp/safewrite-cache")),
            fingerprint: false,
        };
        assert_eq!(
            config.resolve_dir().unwrap(),
            PathBuf::from("/tmp/safewrite-cache")
        );
    }

    #[test]
    fn test_default_cache_dir_is_named_for_crate() {
        let dir = CacheConfig::default().resolve_dir().unwrap();
        assert!(dir.to_string_lossy().contains("safewrite"));
    }
}
