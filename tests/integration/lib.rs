//! Helpers shared by the integration test binaries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use keyhaven_core::config::{BackendPreference, KdfConfig};
use keyhaven_core::Config;
use keyhaven_secrets::{SecureStorageManager, StorageBackend, StorageError};

/// Argon2 parameters small enough for tests.
pub const TEST_KDF: KdfConfig = KdfConfig {
    memory_kib: 64,
    iterations: 1,
    parallelism: 1,
};

/// Config rooted at `dir` with cheap key derivation.
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.kdf = TEST_KDF;
    config.storage.dir = Some(storage_dir(dir));
    config
}

/// Same as [`test_config`] but never touches the OS vault.
pub fn file_only_config(dir: &Path) -> Config {
    let mut config = test_config(dir);
    config.storage.backend = BackendPreference::File;
    config
}

/// Directory the file backend writes to under `dir`.
pub fn storage_dir(dir: &Path) -> PathBuf {
    dir.join("secure-storage")
}

/// Vault connector that always fails, forcing the file fallback.
pub fn unavailable_vault(_service: String) -> Result<Arc<dyn StorageBackend>, StorageError> {
    Err(StorageError::Unavailable)
}

/// Manager whose vault failed to open.
pub async fn fallback_manager(dir: &Path) -> SecureStorageManager {
    SecureStorageManager::with_vault_connector(&test_config(dir), unavailable_vault)
        .await
        .expect("manager with file fallback")
}
