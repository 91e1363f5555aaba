//! crypto/segment.rs
//! `SegmentCipher`: one contract, two constructions.
//!
//! The variant is picked once per stream from the suite. Every segment of the
//! stream then goes through the same value by reference.
//!
//! Contract:
//! - `seal(nonce, aad, pt)` returns exactly `pt.len() + tag_len` bytes.
//! - `open(nonce, aad, ct)` verifies the tag before releasing any plaintext.

use crate::crypto::aead::AeadImpl;
use crate::crypto::ctr_hmac::CtrHmac;
use crate::crypto::types::{CryptoError, DerivedKeyMaterial};
use crate::params::{Construction, StreamParams};

#[derive(Clone)]
pub enum SegmentCipher {
    CounterModeWithMac(CtrHmac),
    DirectAead(AeadImpl),
}

impl SegmentCipher {
    pub fn new(params: &StreamParams, material: &DerivedKeyMaterial) -> Result<Self, CryptoError> {
        match params.suite.construction() {
            Construction::CounterModeWithMac => Ok(Self::CounterModeWithMac(CtrHmac::new(
                params.suite,
                &material.cipher_key,
                &material.mac_key,
                params.tag_len(),
            )?)),
            Construction::DirectAead => Ok(Self::DirectAead(AeadImpl::new(
                params.suite,
                &material.cipher_key,
            )?)),
        }
    }

    pub fn construction(&self) -> Construction {
        match self {
            SegmentCipher::CounterModeWithMac(_) => Construction::CounterModeWithMac,
            SegmentCipher::DirectAead(_) => Construction::DirectAead,
        }
    }

    #[inline]
    pub fn seal(&self, nonce_12: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            SegmentCipher::CounterModeWithMac(c) => c.seal(nonce_12, aad, plaintext),
            SegmentCipher::DirectAead(c) => c.seal(nonce_12, aad, plaintext),
        }
    }

    #[inline]
    pub fn open(&self, nonce_12: &[u8], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            SegmentCipher::CounterModeWithMac(c) => c.open(nonce_12, aad, ciphertext),
            SegmentCipher::DirectAead(c) => c.open(nonce_12, aad, ciphertext),
        }
    }
}
