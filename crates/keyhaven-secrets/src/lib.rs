//! Secure credential storage for Keyhaven.
//!
//! Secrets are kept in the OS credential vault when one is reachable, and in
//! AES-256-GCM encrypted files under a private directory otherwise. The file
//! key is derived with Argon2id from host identity, so encrypted files only
//! open on the machine (and, on most platforms, for the user) that wrote them.
//!
//! [`SecureStorageManager`] is the entry point; [`StorageBridge`] exposes it
//! to untrusted callers as named JSON requests.

mod blocking;

pub mod backend;
pub mod bridge;
pub mod cipher;
pub mod envelope;
pub mod error;
pub mod file;
pub mod key;
pub mod manager;
pub mod types;
pub mod vault;

pub use backend::StorageBackend;
pub use bridge::{BridgeError, BridgeRequest, BridgeResponse, StorageBridge};
pub use cipher::AuthenticatedCipher;
pub use envelope::Envelope;
pub use error::{DecryptionError, EncryptionError, Result, SecretError, StorageError};
pub use file::FileBackend;
pub use key::{HostKeyProvider, IdentitySource, KeyMaterialProvider};
pub use manager::SecureStorageManager;
pub use types::BackendKind;
pub use vault::VaultBackend;
