//! MergeService: orchestrates sources, applies merge policy, deserializes to SafeWriteConfig.

use crate::config::sources::{environment, global_file};
use crate::config::SafeWriteConfig;
use config::{ConfigError, File};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<SafeWriteConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Precedence: defaults (lowest) -> `path` -> environment (highest).
    pub fn load_from_file(path: &Path) -> Result<SafeWriteConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_reads_cache_section() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[cache]\nfingerprint = false\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = MergeService::load_from_file(&path).unwrap();
        assert!(!config.cache.fingerprint);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        assert!(MergeService::load_from_file(&temp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\ndir = \"/from/file\"\n").unwrap();

        std::env::set_var("SAFEWRITE_CACHE__DIR", "/from/env");
        let result = MergeService::load_from_file(&path);
        std::env::remove_var("SAFEWRITE_CACHE__DIR");

        let config = result.unwrap();
        assert_eq!(config.cache.dir, Some(PathBuf::from("/from/env")));
    }
}
