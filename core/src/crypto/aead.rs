//! src/crypto/aead.rs
//! Direct AEAD segment cipher: AES-128-GCM, AES-256-GCM, ChaCha20-Poly1305.
//!
//! Design notes:
//! - All three take a 12-byte nonce and append a 16-byte tag.
//! - The key is the per-stream derived cipher key, never the master key.
//! - Caller provides the segment nonce and the AAD (the encoded header).
//! - Tag verification is constant-time inside the RustCrypto implementations
//!   and fails closed: no plaintext on mismatch.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce as AesNonce};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaNonce};

use crate::constants::{AEAD_TAG_LEN, SEGMENT_NONCE_LEN};
use crate::crypto::types::CryptoError;
use crate::params::CipherSuite;

/// AEAD implementation resolved once from the suite.
#[derive(Clone)]
pub enum AeadImpl {
    Aes128Gcm(Aes128Gcm),
    Aes256Gcm(Aes256Gcm),
    ChaCha(ChaCha20Poly1305),
}

impl AeadImpl {
    /// Construct from a direct-AEAD suite and its derived key.
    pub fn new(suite: CipherSuite, key: &[u8]) -> Result<Self, CryptoError> {
        let bad_len = |_| CryptoError::InvalidKeyLen { expected: suite.key_len(), actual: key.len() };
        match suite {
            CipherSuite::Aes128GcmHkdf => Ok(Self::Aes128Gcm(Aes128Gcm::new_from_slice(key).map_err(bad_len)?)),
            CipherSuite::Aes256GcmHkdf => Ok(Self::Aes256Gcm(Aes256Gcm::new_from_slice(key).map_err(bad_len)?)),
            CipherSuite::ChaCha20Poly1305Hkdf => {
                Ok(Self::ChaCha(ChaCha20Poly1305::new_from_slice(key).map_err(bad_len)?))
            }
            other => Err(CryptoError::Failure(format!("{} is not a direct AEAD suite", other))),
        }
    }

    /// AEAD seal (encrypt) plaintext with nonce and AAD. Empty plaintext is valid.
    pub fn seal(&self, nonce_12: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_nonce(nonce_12)?;
        let payload = Payload { msg: plaintext, aad };
        match self {
            AeadImpl::Aes128Gcm(cipher) => cipher.encrypt(AesNonce::from_slice(nonce_12), payload),
            AeadImpl::Aes256Gcm(cipher) => cipher.encrypt(AesNonce::from_slice(nonce_12), payload),
            AeadImpl::ChaCha(cipher) => cipher.encrypt(ChaNonce::from_slice(nonce_12), payload),
        }
        .map_err(|_| CryptoError::Failure("AEAD seal failed".into()))
    }

    /// AEAD open (decrypt) ciphertext with nonce and AAD.
    pub fn open(&self, nonce_12: &[u8], aad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_nonce(nonce_12)?;
        if ciphertext_and_tag.len() < AEAD_TAG_LEN {
            return Err(CryptoError::CiphertextTooShort {
                len: ciphertext_and_tag.len(),
                tag_len: AEAD_TAG_LEN,
            });
        }
        let payload = Payload { msg: ciphertext_and_tag, aad };
        match self {
            AeadImpl::Aes128Gcm(cipher) => cipher.decrypt(AesNonce::from_slice(nonce_12), payload),
            AeadImpl::Aes256Gcm(cipher) => cipher.decrypt(AesNonce::from_slice(nonce_12), payload),
            AeadImpl::ChaCha(cipher) => cipher.decrypt(ChaNonce::from_slice(nonce_12), payload),
        }
        .map_err(|_| CryptoError::TagMismatch)
    }
}

#[inline]
fn check_nonce(nonce_12: &[u8]) -> Result<(), CryptoError> {
    if nonce_12.len() != SEGMENT_NONCE_LEN {
        return Err(CryptoError::InvalidNonceLen {
            expected: SEGMENT_NONCE_LEN,
            actual: nonce_12.len(),
        });
    }
    Ok(())
}
