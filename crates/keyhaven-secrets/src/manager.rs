//! The storage facade used by the rest of the application.
//!
//! [`SecureStorageManager`] picks a backend once, at construction:
//!
//! 1. If the configuration (or `KEYHAVEN_FILE_BACKEND`) asks for files, use
//!    [`FileBackend`] directly.
//! 2. Otherwise try to open the OS vault. If that fails for any reason, log a
//!    warning and use [`FileBackend`] under the configured storage directory.
//!
//! The choice is never revisited for the life of the instance.
//!
//! # Encryption layers
//!
//! Provider tokens are protected only by the active backend (vault at-rest
//! protection, or the file backend's envelope). Encrypted config documents
//! are always sealed by the manager first and then handed to the backend, so
//! on the file backend they are encrypted twice.

use std::sync::Arc;

use keyhaven_core::config::BackendPreference;
use keyhaven_core::env::{self, vars};
use keyhaven_core::{Config, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::blocking::run_blocking;
use crate::cipher::AuthenticatedCipher;
use crate::error::{Result, SecretError, StorageError};
use crate::file::FileBackend;
use crate::key::HostKeyProvider;
use crate::types::{BackendKind, CONFIG_NAMESPACE, PROVIDER_NAMESPACE, SYSTEM_SETTINGS_KEY};
use crate::vault::VaultBackend;

/// Facade over whichever storage backend is active.
///
/// Construct one per process and share it (it is cheap to wrap in an `Arc`).
pub struct SecureStorageManager {
    backend: Arc<dyn StorageBackend>,
    cipher: AuthenticatedCipher,
}

impl SecureStorageManager {
    /// Build a manager from configuration, preferring the OS vault.
    pub async fn new(config: &Config) -> Result<Self> {
        Self::with_vault_connector(config, |service_name| {
            let vault = VaultBackend::connect(&service_name)?;
            Ok(Arc::new(vault) as Arc<dyn StorageBackend>)
        })
        .await
    }

    /// Build a manager with a custom vault constructor.
    ///
    /// `connect` receives the configured service name and runs on the
    /// blocking pool. Any error it returns triggers the file fallback.
    pub async fn with_vault_connector<F>(config: &Config, connect: F) -> Result<Self>
    where
        F: FnOnce(String) -> std::result::Result<Arc<dyn StorageBackend>, StorageError>
            + Send
            + 'static,
    {
        let keys = HostKeyProvider::new(&config.kdf)?;
        let cipher = AuthenticatedCipher::new(Arc::new(keys));

        let file_only = config.storage.backend == BackendPreference::File
            || env::get_bool(vars::KEYHAVEN_FILE_BACKEND);

        let backend = if file_only {
            debug!("vault skipped by configuration");
            file_backend(config, &cipher)?
        } else {
            let service_name = config.storage.service_name.clone();
            match run_blocking(move || connect(service_name)).await.and_then(|r| r) {
                Ok(vault) => vault,
                Err(e) => {
                    warn!(error = %e, "OS vault unavailable, falling back to encrypted files");
                    file_backend(config, &cipher)?
                }
            }
        };

        info!(backend = %backend.kind(), "secure storage ready");
        Ok(Self::from_parts(backend, cipher))
    }

    /// Assemble a manager from an already-chosen backend.
    pub fn from_parts(backend: Arc<dyn StorageBackend>, cipher: AuthenticatedCipher) -> Self {
        Self { backend, cipher }
    }

    /// Which backend this instance uses.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    // ── provider tokens ─────────────────────────────────────────────

    pub async fn store_provider_token(&self, provider_id: &str, token: &str) -> Result<()> {
        require("provider id", provider_id)?;
        traced(
            "store_provider_token",
            self.backend
                .store(PROVIDER_NAMESPACE, provider_id, token)
                .await
                .map_err(SecretError::from),
        )
    }

    pub async fn get_provider_token(&self, provider_id: &str) -> Result<Option<SecretString>> {
        require("provider id", provider_id)?;
        traced(
            "get_provider_token",
            self.backend
                .retrieve(PROVIDER_NAMESPACE, provider_id)
                .await
                .map_err(SecretError::from),
        )
    }

    /// Remove a provider token. Best effort: every failure, including an
    /// invalid id, is logged and reported as `false`.
    pub async fn delete_provider_token(&self, provider_id: &str) -> bool {
        let result = match require("provider id", provider_id) {
            Ok(()) => self
                .backend
                .delete(PROVIDER_NAMESPACE, provider_id)
                .await
                .map_err(SecretError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(removed) => removed,
            Err(e) => {
                warn!(
                    op = "delete_provider_token",
                    category = e.category(),
                    "secure storage operation failed"
                );
                false
            }
        }
    }

    // ── encrypted config ────────────────────────────────────────────

    /// Serialize `document`, seal it, and store it under `key` in the config
    /// namespace.
    pub async fn store_encrypted_config<T>(&self, key: &str, document: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        require("config key", key)?;
        let result = self.put_config(key, document).await;
        traced("store_encrypted_config", result)
    }

    /// Load, open and parse the document stored under `key`.
    ///
    /// A document that exists but cannot be decrypted is an error, not
    /// `None`.
    pub async fn get_encrypted_config(&self, key: &str) -> Result<Option<Value>> {
        self.get_encrypted_config_as(key).await
    }

    /// Like [`get_encrypted_config`](Self::get_encrypted_config), parsing into
    /// a caller-chosen type.
    pub async fn get_encrypted_config_as<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        require("config key", key)?;
        let result = self.load_config(key).await;
        traced("get_encrypted_config", result)
    }

    pub async fn store_system_settings<T>(&self, settings: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.store_encrypted_config(SYSTEM_SETTINGS_KEY, settings).await
    }

    pub async fn get_system_settings(&self) -> Result<Option<Value>> {
        self.get_encrypted_config(SYSTEM_SETTINGS_KEY).await
    }

    // ── raw envelope API ────────────────────────────────────────────

    /// Seal `plaintext` with the host-bound key and return the envelope.
    pub async fn encrypt_data(&self, plaintext: &str) -> Result<String> {
        let result = self.seal(SecretString::new(plaintext)).await;
        traced("encrypt_data", result)
    }

    /// Open an envelope produced by [`encrypt_data`](Self::encrypt_data).
    pub async fn decrypt_data(&self, envelope: &str) -> Result<SecretString> {
        let result = self.open(SecretString::new(envelope)).await;
        traced("decrypt_data", result)
    }

    async fn put_config<T>(&self, key: &str, document: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let serialized = SecretString::new(serde_json::to_string(document)?);
        let envelope = self.seal(serialized).await?;
        self.backend.store(CONFIG_NAMESPACE, key, &envelope).await?;
        Ok(())
    }

    async fn load_config<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(envelope) = self.backend.retrieve(CONFIG_NAMESPACE, key).await? else {
            return Ok(None);
        };
        let plaintext = self.open(envelope).await?;
        Ok(Some(serde_json::from_str(plaintext.expose_secret())?))
    }

    async fn seal(&self, plaintext: SecretString) -> Result<String> {
        let cipher = self.cipher.clone();
        let envelope = run_blocking(move || cipher.encrypt(plaintext.expose_secret())).await??;
        Ok(envelope)
    }

    async fn open(&self, envelope: SecretString) -> Result<SecretString> {
        let cipher = self.cipher.clone();
        let plaintext = run_blocking(move || cipher.decrypt(envelope.expose_secret())).await??;
        Ok(plaintext)
    }
}

impl std::fmt::Debug for SecureStorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStorageManager")
            .field("backend", &self.backend.kind())
            .finish_non_exhaustive()
    }
}

fn file_backend(config: &Config, cipher: &AuthenticatedCipher) -> Result<Arc<dyn StorageBackend>> {
    let dir = config.storage_dir()?;
    Ok(Arc::new(FileBackend::new(dir, cipher.clone())))
}

fn require(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SecretError::Validation(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Log the failure category of a manager operation and pass the result on.
fn traced<T>(op: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        debug!(op, category = e.category(), "secure storage operation failed");
    }
    result
}
