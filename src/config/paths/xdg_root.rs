//! XDG Base Directory utilities for config, cache and log locations.

use crate::error::WriteError;
use std::path::PathBuf;

const APP_NAME: &str = "safewrite";

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, WriteError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        WriteError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// Returns `$XDG_CONFIG_HOME/safewrite/config.toml`
pub fn global_config_path() -> Result<PathBuf, WriteError> {
    Ok(config_home()?.join(APP_NAME).join("config.toml"))
}

fn project_dirs() -> Result<directories::ProjectDirs, WriteError> {
    directories::ProjectDirs::from("", "", APP_NAME).ok_or_else(|| {
        WriteError::ConfigError("Could not determine platform home directory".to_string())
    })
}

/// Per-user cache directory for derived cache files.
pub fn default_cache_dir() -> Result<PathBuf, WriteError> {
    Ok(project_dirs()?.cache_dir().to_path_buf())
}

/// Per-user state directory, used for the default log file.
///
/// Falls back to the data-local directory on platforms without a state dir.
pub fn default_state_dir() -> Result<PathBuf, WriteError> {
    let dirs = project_dirs()?;
    Ok(dirs
        .state_dir()
        .unwrap_or_else(|| dirs.data_local_dir())
        .to_path_buf())
}
