//! The storage backend abstraction.

use async_trait::async_trait;
use keyhaven_core::SecretString;

use crate::error::StorageError;
use crate::types::BackendKind;

/// A place where `(namespace, account)` secrets live.
///
/// Implementations must keep namespaces isolated: the same account under two
/// namespaces is two independent records. A second `store` to the same pair
/// overwrites the first. Concurrent writers to one pair race, and the last
/// write wins.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which kind of store this is.
    fn kind(&self) -> BackendKind;

    /// Create or overwrite the value for `(namespace, account)`.
    async fn store(&self, namespace: &str, account: &str, value: &str)
        -> Result<(), StorageError>;

    /// Read the value for `(namespace, account)`.
    ///
    /// Returns `Ok(None)` when nothing was stored. An entry that exists but
    /// cannot be decrypted is an error, never `None`.
    async fn retrieve(
        &self,
        namespace: &str,
        account: &str,
    ) -> Result<Option<SecretString>, StorageError>;

    /// Remove the value for `(namespace, account)`.
    ///
    /// Returns `true` if something was removed and `false` if nothing was
    /// stored.
    async fn delete(&self, namespace: &str, account: &str) -> Result<bool, StorageError>;
}
