//! Path resolution utilities.

use crate::env::{get_var, vars};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Keyhaven base directory.
///
/// `KEYHAVEN_HOME` wins when set; otherwise `~/.keyhaven`.
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = get_var(vars::KEYHAVEN_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".keyhaven"))
}

/// Get the main config file path.
///
/// `KEYHAVEN_CONFIG` wins when set; otherwise `<base>/keyhaven.json5`.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = get_var(vars::KEYHAVEN_CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("keyhaven.json5"))
}

/// Get the default private directory used by the file backend
/// (`<base>/secure-storage`).
pub fn secure_storage_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("secure-storage"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
