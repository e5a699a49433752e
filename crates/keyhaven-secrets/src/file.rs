//! Encrypted-file storage backend.
//!
//! Each secret is one file `{dir}/{namespace}_{account}.enc` holding an
//! envelope produced by [`AuthenticatedCipher`]. The directory is created on
//! the first write with mode `0700`; files are written with mode `0600` on
//! Unix. Writes go straight to the target file, so a crash mid-write leaves
//! an entry that later fails to decrypt.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use keyhaven_core::SecretString;
use tracing::debug;

use crate::backend::StorageBackend;
use crate::blocking::run_blocking;
use crate::cipher::AuthenticatedCipher;
use crate::error::{DecryptionError, StorageError};
use crate::types::{BackendKind, SecretKey};

/// Stores secrets as encrypted files under a private directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    cipher: AuthenticatedCipher,
}

impl FileBackend {
    /// Create a backend rooted at `dir`. Nothing touches the disk until the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>, cipher: AuthenticatedCipher) -> Self {
        Self {
            dir: dir.into(),
            cipher,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `(namespace, account)`.
    pub fn entry_path(&self, namespace: &str, account: &str) -> PathBuf {
        self.dir.join(SecretKey::new(namespace, account).file_name())
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            tokio::fs::set_permissions(&self.dir, perms).await?;
        }

        Ok(())
    }
}

/// Write `data` to `path` with mode 0600 on Unix.
async fn write_entry_file(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    tokio::fs::write(path, data).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    Ok(())
}

#[async_trait]
impl StorageBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn store(
        &self,
        namespace: &str,
        account: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        let cipher = self.cipher.clone();
        let plaintext = SecretString::new(value);
        let envelope = run_blocking(move || cipher.encrypt(plaintext.expose_secret())).await??;

        debug!(namespace, "writing encrypted entry");
        write_entry_file(&self.entry_path(namespace, account), envelope.as_bytes()).await
    }

    async fn retrieve(
        &self,
        namespace: &str,
        account: &str,
    ) -> Result<Option<SecretString>, StorageError> {
        let path = self.entry_path(namespace, account);
        let envelope = match tokio::fs::read_to_string(&path).await {
            Ok(envelope) => envelope,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(StorageError::Corrupted(DecryptionError::InvalidUtf8))
            }
            Err(e) => return Err(e.into()),
        };

        let cipher = self.cipher.clone();
        let value = run_blocking(move || cipher.decrypt(envelope.trim_end())).await??;
        Ok(Some(value))
    }

    async fn delete(&self, namespace: &str, account: &str) -> Result<bool, StorageError> {
        match tokio::fs::remove_file(self.entry_path(namespace, account)).await {
            Ok(()) => {
                debug!(namespace, "deleted encrypted entry");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{HostKeyProvider, IdentitySource};
    use keyhaven_core::config::KdfConfig;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn cipher_for(identity: &str) -> AuthenticatedCipher {
        let kdf = KdfConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        };
        let provider =
            HostKeyProvider::with_identity(&kdf, IdentitySource::Fixed(identity.into())).unwrap();
        AuthenticatedCipher::new(Arc::new(provider))
    }

    fn test_backend() -> (FileBackend, TempDir) {
        let tmp = TempDir::new().unwrap();
        let backend = FileBackend::new(tmp.path().join("secure-storage"), cipher_for("host-1"));
        (backend, tmp)
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let (backend, _tmp) = test_backend();
        backend.store("provider", "p1", "sk-abc123").await.unwrap();

        let value = backend.retrieve("provider", "p1").await.unwrap().unwrap();
        assert_eq!(value.expose_secret(), "sk-abc123");
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_none() {
        let (backend, _tmp) = test_backend();
        assert!(backend.retrieve("provider", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_holds_envelope_not_plaintext() {
        let (backend, _tmp) = test_backend();
        backend.store("provider", "p1", "sk-abc123").await.unwrap();

        let raw = std::fs::read_to_string(backend.entry_path("provider", "p1")).unwrap();
        assert!(!raw.contains("sk-abc123"));
        assert_eq!(raw.split(':').count(), 3);
        assert!(backend.dir().join("provider_p1.enc").exists());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let (backend, _tmp) = test_backend();
        backend.store("provider", "p1", "old").await.unwrap();
        backend.store("provider", "p1", "new").await.unwrap();

        let value = backend.retrieve("provider", "p1").await.unwrap().unwrap();
        assert_eq!(value.expose_secret(), "new");
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let (backend, _tmp) = test_backend();
        backend.store("provider", "x", "token").await.unwrap();
        backend.store("config", "x", "{}").await.unwrap();

        assert!(backend.delete("provider", "x").await.unwrap());
        assert!(backend.retrieve("provider", "x").await.unwrap().is_none());
        assert_eq!(
            backend.retrieve("config", "x").await.unwrap().unwrap().expose_secret(),
            "{}"
        );
    }

    #[tokio::test]
    async fn test_sanitized_names_collide() {
        let (backend, _tmp) = test_backend();
        backend.store("provider", "team.alpha", "first").await.unwrap();
        backend.store("provider", "team-alpha", "second").await.unwrap();

        let value = backend
            .retrieve("provider", "team.alpha")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.expose_secret(), "second");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (backend, _tmp) = test_backend();
        backend.store("provider", "p1", "v").await.unwrap();

        assert!(backend.delete("provider", "p1").await.unwrap());
        assert!(!backend.delete("provider", "p1").await.unwrap());
        assert!(!backend.delete("provider", "never").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let (backend, _tmp) = test_backend();
        backend.store("provider", "p1", "v").await.unwrap();

        let path = backend.entry_path("provider", "p1");
        std::fs::write(&path, "not-an-envelope").unwrap();
        assert!(matches!(
            backend.retrieve("provider", "p1").await,
            Err(StorageError::Corrupted(DecryptionError::MalformedEnvelope { found: 1 }))
        ));

        // Truncated mid-write.
        backend.store("provider", "p1", "v").await.unwrap();
        let envelope = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, &envelope[..envelope.len() - 2]).unwrap();
        assert!(matches!(
            backend.retrieve("provider", "p1").await,
            Err(StorageError::Corrupted(_))
        ));
    }

    #[tokio::test]
    async fn test_other_host_reports_corruption() {
        let (backend, tmp) = test_backend();
        backend.store("provider", "p1", "v").await.unwrap();

        let elsewhere = FileBackend::new(tmp.path().join("secure-storage"), cipher_for("host-2"));
        assert!(matches!(
            elsewhere.retrieve("provider", "p1").await,
            Err(StorageError::Corrupted(DecryptionError::AuthenticationFailed))
        ));
    }

    #[tokio::test]
    async fn test_directory_created_lazily() {
        let (backend, _tmp) = test_backend();
        assert!(!backend.dir().exists());
        assert!(backend.retrieve("provider", "p1").await.unwrap().is_none());
        assert!(!backend.dir().exists());

        backend.store("provider", "p1", "v").await.unwrap();
        assert!(backend.dir().is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (backend, _tmp) = test_backend();
        backend.store("provider", "p1", "v").await.unwrap();

        let dir_mode = std::fs::metadata(backend.dir()).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);

        let file_mode = std::fs::metadata(backend.entry_path("provider", "p1"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(file_mode & 0o777, 0o600);
    }
}
