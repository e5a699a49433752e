//! Configuration loading and persistence.

use super::{Config, KdfConfig};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Argon2 refuses fewer than 8 KiB per lane.
const MIN_MEMORY_KIB_PER_LANE: u32 = 8;

/// Upper bound on lanes accepted by Argon2.
const MAX_PARALLELISM: u32 = 0x00ff_ffff;

impl Config {
    /// Load configuration from the default path, or defaults if no file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load_or_default(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. Parse errors are still reported.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Vault service name
        let service = self.storage.service_name.trim();
        if service.is_empty() {
            errors.push("storage.service_name must not be empty".to_string());
        } else if service.contains(char::is_whitespace) {
            errors.push(format!(
                "storage.service_name '{}' must not contain whitespace",
                service
            ));
        }

        // 2. Fallback directory must be usable as a private root
        if let Some(dir) = &self.storage.dir {
            if dir.as_os_str().is_empty() {
                errors.push("storage.dir must not be empty when set".to_string());
            }
        }

        // 3. Argon2 parameters
        errors.extend(validate_kdf(&self.kdf));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Directory used by the file backend.
    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.dir {
            Some(dir) => Ok(paths::expand_tilde(&dir.to_string_lossy())),
            None => paths::secure_storage_dir(),
        }
    }
}

fn validate_kdf(kdf: &KdfConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if kdf.iterations == 0 {
        errors.push("kdf.iterations must be greater than 0".to_string());
    }
    if kdf.parallelism == 0 || kdf.parallelism > MAX_PARALLELISM {
        errors.push(format!(
            "kdf.parallelism must be between 1 and {}, got {}",
            MAX_PARALLELISM, kdf.parallelism
        ));
    } else if kdf.memory_kib < MIN_MEMORY_KIB_PER_LANE * kdf.parallelism {
        errors.push(format!(
            "kdf.memory_kib must be at least {} for parallelism {}, got {}",
            MIN_MEMORY_KIB_PER_LANE * kdf.parallelism,
            kdf.parallelism,
            kdf.memory_kib
        ));
    }

    errors
}
