//! Host-bound key derivation.
//!
//! The symmetric key used by the file backend and the raw encrypt/decrypt
//! API is stretched from host identity strings with Argon2id and a constant
//! salt:
//!
//! - **Windows**: computer name + user name
//! - **macOS**: host name
//! - **Linux / other**: host name + numeric user id
//!
//! When none of these are available the literal `default-machine-id` is used.
//!
//! # Security Notes
//!
//! - The input material is low-entropy and semi-public. Anyone who knows or
//!   guesses the host name and user can derive the same key. The derivation
//!   binds ciphertext to a host; it does not protect it from a local attacker.
//! - The salt is a fixed, non-secret literal and no per-installation entropy
//!   is mixed in.
//! - The key is recomputed on every call and never persisted. The copy handed
//!   out is wiped on drop.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use keyhaven_core::config::KdfConfig;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::SecretError;

/// Length of the derived AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Application-wide Argon2 salt.
const KDF_SALT: &[u8] = b"keyhaven-secure-storage-v1";

/// Identity used when the host reveals nothing about itself.
pub const FALLBACK_IDENTITY: &str = "default-machine-id";

/// A 256-bit key that is zeroed when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Source of the symmetric key used by [`AuthenticatedCipher`](crate::AuthenticatedCipher).
///
/// Implementations must be deterministic: the same provider on the same host
/// always yields the same key.
pub trait KeyMaterialProvider: Send + Sync {
    /// Produce the key. There is no failure path; a key is always returned.
    fn derive_key(&self) -> DerivedKey;
}

/// Where identity material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// Read the platform identifiers of the current host on every call.
    Host,
    /// Use a fixed identity string (tests, or re-deriving a key for a known host).
    Fixed(String),
}

impl IdentitySource {
    fn resolve(&self) -> Zeroizing<String> {
        match self {
            Self::Host => Zeroizing::new(host_identity()),
            Self::Fixed(identity) if identity.is_empty() => {
                Zeroizing::new(FALLBACK_IDENTITY.to_string())
            }
            Self::Fixed(identity) => Zeroizing::new(identity.clone()),
        }
    }
}

/// Argon2id-based [`KeyMaterialProvider`] bound to the host identity.
#[derive(Debug, Clone)]
pub struct HostKeyProvider {
    params: Params,
    identity: IdentitySource,
}

impl HostKeyProvider {
    /// Build a provider reading the current host's identity.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Validation`] if the Argon2 cost parameters are
    /// out of range.
    pub fn new(kdf: &KdfConfig) -> Result<Self, SecretError> {
        Self::with_identity(kdf, IdentitySource::Host)
    }

    /// Build a provider with an explicit identity source.
    pub fn with_identity(kdf: &KdfConfig, identity: IdentitySource) -> Result<Self, SecretError> {
        let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, Some(KEY_LEN))
            .map_err(|e| {
                SecretError::Validation(format!("invalid key derivation parameters: {e}"))
            })?;
        Ok(Self { params, identity })
    }
}

impl KeyMaterialProvider for HostKeyProvider {
    fn derive_key(&self) -> DerivedKey {
        let identity = self.identity.resolve();
        let mut key = [0u8; KEY_LEN];
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .hash_password_into(identity.as_bytes(), KDF_SALT, &mut key)
            .expect("argon2 parameters are validated in HostKeyProvider::with_identity");
        let derived = DerivedKey(key);
        key.zeroize();
        derived
    }
}

/// Collect the platform identity string for the current host.
pub fn host_identity() -> String {
    let parts: Vec<String> = platform_identity_parts()
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        FALLBACK_IDENTITY.to_string()
    } else {
        parts.join("-")
    }
}

#[cfg(windows)]
fn platform_identity_parts() -> Vec<String> {
    vec![env_or_empty("COMPUTERNAME"), env_or_empty("USERNAME")]
}

#[cfg(target_os = "macos")]
fn platform_identity_parts() -> Vec<String> {
    vec![host_name()]
}

#[cfg(not(any(windows, target_os = "macos")))]
fn platform_identity_parts() -> Vec<String> {
    vec![host_name(), user_id()]
}

#[cfg(windows)]
fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

#[cfg(not(windows))]
fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().trim().to_string())
        .unwrap_or_default()
}

#[cfg(all(unix, not(target_os = "macos")))]
fn user_id() -> String {
    nix::unistd::getuid().as_raw().to_string()
}

#[cfg(not(any(unix, windows)))]
fn user_id() -> String {
    String::new()
}
