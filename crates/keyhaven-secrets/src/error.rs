//! Error types for secure storage.
//!
//! Each layer has its own error type and wraps the one below it:
//! envelope/cipher ([`DecryptionError`], [`EncryptionError`]) → backend
//! ([`StorageError`]) → manager ([`SecretError`]). The split between "storage
//! could not be reached" and "storage was reached but the content is invalid"
//! survives every hop.
//!
//! None of these types carry secret values, envelopes, or text produced by the
//! host vault. Their `Display` output is safe to log.

use thiserror::Error;

/// An envelope could not be turned back into plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptionError {
    /// The envelope did not split into exactly three `:`-separated fields.
    #[error("malformed envelope: expected 3 fields, found {found}")]
    MalformedEnvelope { found: usize },

    /// A field was not valid hexadecimal.
    #[error("malformed envelope: {field} is not valid hex")]
    InvalidHex { field: &'static str },

    /// A field decoded to the wrong number of bytes.
    #[error("malformed envelope: {field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The authentication tag did not verify (tampering, corruption, or a key
    /// derived on a different host).
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The authenticated plaintext was not UTF-8.
    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// The AEAD refused to seal a plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("encryption failed")]
pub struct EncryptionError;

/// A backend-level failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be reached or opened.
    #[error("secure storage unavailable")]
    Unavailable,

    /// The backing store refused the operation.
    #[error("secure storage access denied")]
    AccessDenied,

    /// The value cannot be represented in the backing store.
    #[error("secure storage rejected the value")]
    Rejected,

    /// Filesystem failure. Only the error kind is kept; paths are dropped.
    #[error("secure storage i/o failure: {0:?}")]
    Io(std::io::ErrorKind),

    #[error("secure storage could not encrypt the value")]
    Encryption(#[from] EncryptionError),

    /// The store was reached but the entry failed to decrypt.
    #[error("stored entry is corrupted: {0}")]
    Corrupted(#[from] DecryptionError),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied,
            kind => Self::Io(kind),
        }
    }
}

/// Errors returned by [`SecureStorageManager`](crate::SecureStorageManager).
#[derive(Debug, Error)]
pub enum SecretError {
    /// Storage could not be reached or refused the operation.
    #[error(transparent)]
    Storage(StorageError),

    /// Storage was reached but the content failed to decrypt.
    #[error("decryption failed: {0}")]
    Decryption(#[from] DecryptionError),

    /// The caller passed an unusable argument.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A config document could not be serialized or parsed.
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// The manager could not be set up from the configuration.
    #[error(transparent)]
    Config(#[from] keyhaven_core::ConfigError),
}

impl SecretError {
    /// A short, static label that is safe to log.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage",
            Self::Decryption(_) => "decryption",
            Self::Validation(_) => "validation",
            Self::InvalidDocument(_) => "document",
            Self::Config(_) => "config",
        }
    }
}

impl From<StorageError> for SecretError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Corrupted(inner) => Self::Decryption(inner),
            other => Self::Storage(other),
        }
    }
}

impl From<EncryptionError> for SecretError {
    fn from(err: EncryptionError) -> Self {
        Self::Storage(StorageError::Encryption(err))
    }
}

/// Convenience result alias for manager operations.
pub type Result<T> = std::result::Result<T, SecretError>;
