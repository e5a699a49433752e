//! OS credential vault backend.
//!
//! Secrets go to the platform store through the `keyring` crate (macOS
//! Keychain, Windows Credential Manager, Secret Service or kernel keyutils on
//! Linux). Entries are filed under service `<service_name>-<version>` with
//! account `namespace:account`. The vault provides its own at-rest
//! protection, so values are handed over unencrypted.
//!
//! Vault errors are reduced to an opaque [`StorageError`]; the platform's
//! message text is never surfaced or logged.

use async_trait::async_trait;
use keyhaven_core::SecretString;
use keyring::Entry;
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::blocking::run_blocking;
use crate::error::{DecryptionError, StorageError};
use crate::types::{BackendKind, SecretKey};

/// Account read once at construction to check that the vault answers.
const PROBE_ACCOUNT: &str = "keyhaven:availability-probe";

/// Secrets stored in the host's credential vault.
#[derive(Debug, Clone)]
pub struct VaultBackend {
    service: String,
}

impl VaultBackend {
    /// Effective service identifier for a configured service name.
    pub fn service_for(service_name: &str) -> String {
        format!("{}-{}", service_name, env!("CARGO_PKG_VERSION"))
    }

    /// Connect to the vault and verify it is usable.
    ///
    /// Performs one blocking read of a probe entry. A missing probe entry is
    /// the expected answer; any other failure means the vault cannot be used
    /// on this host. Call from a blocking context.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] or [`StorageError::AccessDenied`]
    /// when the platform store cannot be reached.
    pub fn connect(service_name: &str) -> Result<Self, StorageError> {
        let service = Self::service_for(service_name);
        let probe = open_entry(&service, PROBE_ACCOUNT)?;
        match probe.get_password() {
            Ok(_) | Err(keyring::Error::NoEntry) => {
                debug!(service = %service, "OS vault available");
                Ok(Self { service })
            }
            Err(e) => {
                let err = map_keyring_error(&e);
                warn!(error = %err, "OS vault probe failed");
                Err(err)
            }
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Owned `(service, account)` pair for a blocking vault call.
    fn locate(&self, namespace: &str, account: &str) -> (String, String) {
        (
            self.service.clone(),
            SecretKey::new(namespace, account).vault_account(),
        )
    }
}

fn open_entry(service: &str, vault_account: &str) -> Result<Entry, StorageError> {
    Entry::new(service, vault_account).map_err(|e| map_keyring_error(&e))
}

/// Map a keyring error onto an opaque category.
fn map_keyring_error(err: &keyring::Error) -> StorageError {
    match err {
        keyring::Error::NoStorageAccess(_) => StorageError::AccessDenied,
        keyring::Error::BadEncoding(_) => StorageError::Corrupted(DecryptionError::InvalidUtf8),
        keyring::Error::TooLong(..) | keyring::Error::Invalid(..) => StorageError::Rejected,
        _ => StorageError::Unavailable,
    }
}

#[async_trait]
impl StorageBackend for VaultBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vault
    }

    async fn store(
        &self,
        namespace: &str,
        account: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        let (service, vault_account) = self.locate(namespace, account);
        let value = SecretString::new(value);

        run_blocking(move || {
            let entry = open_entry(&service, &vault_account)?;
            entry
                .set_password(value.expose_secret())
                .map_err(|e| map_keyring_error(&e))
        })
        .await??;

        debug!(namespace, "stored vault entry");
        Ok(())
    }

    async fn retrieve(
        &self,
        namespace: &str,
        account: &str,
    ) -> Result<Option<SecretString>, StorageError> {
        let (service, vault_account) = self.locate(namespace, account);

        run_blocking(move || {
            let entry = open_entry(&service, &vault_account)?;
            match entry.get_password() {
                Ok(password) => Ok(Some(SecretString::from(password))),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(map_keyring_error(&e)),
            }
        })
        .await?
    }

    async fn delete(&self, namespace: &str, account: &str) -> Result<bool, StorageError> {
        let (service, vault_account) = self.locate(namespace, account);

        let removed = run_blocking(move || {
            let entry = open_entry(&service, &vault_account)?;
            match entry.delete_password() {
                Ok(()) => Ok(true),
                Err(keyring::Error::NoEntry) => Ok(false),
                Err(e) => Err(map_keyring_error(&e)),
            }
        })
        .await??;

        if removed {
            debug!(namespace, "deleted vault entry");
        }
        Ok(removed)
    }
}
