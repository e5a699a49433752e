//! Text encoding of an encrypted value.
//!
//! An envelope is `nonce:tag:ciphertext`, each field lower-case hex. This is
//! the exact content of a file-backend `.enc` file and the value returned by
//! the raw encrypt operation.

use std::fmt;
use std::str::FromStr;

use crate::error::DecryptionError;

/// Nonce length in bytes (128 bits).
pub const NONCE_LEN: usize = 16;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

const SEPARATOR: char = ':';

/// A parsed `nonce:tag:ciphertext` triple.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parse an envelope, rejecting anything that is not exactly three hex
    /// fields with correctly sized nonce and tag.
    pub fn parse(encoded: &str) -> Result<Self, DecryptionError> {
        let fields: Vec<&str> = encoded.split(SEPARATOR).collect();
        let [nonce, tag, ciphertext] = fields.as_slice() else {
            return Err(DecryptionError::MalformedEnvelope {
                found: fields.len(),
            });
        };

        Ok(Self {
            nonce: decode_fixed("nonce", nonce)?,
            tag: decode_fixed("tag", tag)?,
            ciphertext: decode_field("ciphertext", ciphertext)?,
        })
    }

    /// Render the envelope in its `nonce:tag:ciphertext` text form.
    pub fn encode(&self) -> String {
        let mut out =
            String::with_capacity(2 * (NONCE_LEN + TAG_LEN + self.ciphertext.len()) + 2);
        out.push_str(&hex::encode(self.nonce));
        out.push(SEPARATOR);
        out.push_str(&hex::encode(self.tag));
        out.push(SEPARATOR);
        out.push_str(&hex::encode(&self.ciphertext));
        out
    }
}

impl FromStr for Envelope {
    type Err = DecryptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// Envelopes never show up in logs, even in debug builds.
impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, DecryptionError> {
    hex::decode(value).map_err(|_| DecryptionError::InvalidHex { field })
}

fn decode_fixed<const N: usize>(
    field: &'static str,
    value: &str,
) -> Result<[u8; N], DecryptionError> {
    let bytes = decode_field(field, value)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| DecryptionError::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}
