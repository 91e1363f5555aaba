//! crypto/types.rs
//! Key containers and primitive-level errors.
//!
//! Security notes:
//! - `MasterKey` and `DerivedKeyMaterial` wipe their bytes on drop.
//! - `Debug` never prints key bytes.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::NONCE_PREFIX_LEN;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key length rejected by a primitive.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// Nonce length mismatch (segment nonces are 12 bytes).
    #[error("invalid nonce length: expected={expected}, actual={actual}")]
    InvalidNonceLen { expected: usize, actual: usize },

    /// Ciphertext shorter than the tag.
    #[error("ciphertext too short: {len} < tag length {tag_len}")]
    CiphertextTooShort { len: usize, tag_len: usize },

    /// Tag mismatch (authentication failure).
    #[error("tag mismatch")]
    TagMismatch,

    /// General runtime failure with context.
    #[error("crypto failure: {0}")]
    Failure(String),
}

/// Caller-supplied master key. Never mutated after construction.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    pub fn new(bytes: &[u8]) -> Self {
        Self { bytes: bytes.to_vec() }
    }

    /// Fresh random key of `len` bytes from the OS RNG.
    pub fn generate(len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&[u8]> for MasterKey {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey([REDACTED; {}])", self.bytes.len())
    }
}

/// Per-stream key material: one HKDF expand, split in order.
/// `mac_key` is empty for the direct AEAD suites.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeyMaterial {
    pub cipher_key: Vec<u8>,
    pub mac_key: Vec<u8>,
    pub nonce_prefix: [u8; NONCE_PREFIX_LEN],
}

impl fmt::Debug for DerivedKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeyMaterial")
            .field("cipher_key", &format_args!("[REDACTED; {}]", self.cipher_key.len()))
            .field("mac_key", &format_args!("[REDACTED; {}]", self.mac_key.len()))
            .field("nonce_prefix", &hex::encode(self.nonce_prefix))
            .finish()
    }
}
