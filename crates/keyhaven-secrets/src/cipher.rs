//! AES-256-GCM over host-derived keys.
//!
//! Every call draws a fresh random 16-byte nonce, so sealing the same
//! plaintext twice never yields the same envelope. The tag is kept detached
//! and travels as its own envelope field. No associated data is bound.

use std::sync::Arc;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, Key, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use keyhaven_core::SecretString;
use rand::RngCore;
use zeroize::Zeroize;

use crate::envelope::{Envelope, NONCE_LEN};
use crate::error::{DecryptionError, EncryptionError};
use crate::key::KeyMaterialProvider;

/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Seals and opens [`Envelope`]s with a key from a [`KeyMaterialProvider`].
///
/// The key is derived again for every call and dropped (zeroed) before the
/// call returns. Cloning is cheap; clones share the provider.
#[derive(Clone)]
pub struct AuthenticatedCipher {
    keys: Arc<dyn KeyMaterialProvider>,
}

impl AuthenticatedCipher {
    pub fn new(keys: Arc<dyn KeyMaterialProvider>) -> Self {
        Self { keys }
    }

    /// Encrypt `plaintext` and return the envelope text.
    ///
    /// This runs the key derivation synchronously; async callers should move
    /// it onto the blocking pool.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let key = self.keys.derive_key();
        let aead = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key.as_bytes()));

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = match aead.encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        {
            Ok(tag) => tag,
            Err(_) => {
                buffer.zeroize();
                return Err(EncryptionError);
            }
        };

        Ok(Envelope {
            nonce,
            tag: tag.into(),
            ciphertext: buffer,
        }
        .encode())
    }

    /// Verify and decrypt an envelope.
    ///
    /// Fails closed: a malformed envelope, a tag that does not verify, or a
    /// plaintext that is not UTF-8 all return an error and no partial output.
    pub fn decrypt(&self, encoded: &str) -> Result<SecretString, DecryptionError> {
        let Envelope {
            nonce,
            tag,
            mut ciphertext,
        } = Envelope::parse(encoded)?;

        let key = self.keys.derive_key();
        let aead = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key.as_bytes()));

        if aead
            .decrypt_in_place_detached(
                Nonce::from_slice(&nonce),
                b"",
                &mut ciphertext,
                Tag::from_slice(&tag),
            )
            .is_err()
        {
            return Err(DecryptionError::AuthenticationFailed);
        }

        String::from_utf8(ciphertext)
            .map(SecretString::from)
            .map_err(|e| {
                e.into_bytes().zeroize();
                DecryptionError::InvalidUtf8
            })
    }
}

impl std::fmt::Debug for AuthenticatedCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedCipher").finish_non_exhaustive()
    }
}
