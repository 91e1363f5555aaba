//! crypto/kdf.rs
//! HKDF-SHA256 derivation of per-stream key material.
//!
//! Design:
//! - HKDF-Extract(salt, master_key) -> PRK
//! - HKDF-Expand(PRK, info) -> cipher_key || [mac_key] || nonce_prefix
//!
//! `info` binds the derivation to this construction, the suite, the segment
//! size and the caller's associated data:
//! `KDF_CONTEXT_LABEL || suite_id || segment_size (u32 BE) || associated_data`.
//!
//! Security notes:
//! - The master key is never used directly by a cipher.
//! - The salt must be random per stream; it is the only thing separating
//!   the key material of two streams under one master key.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::constants::{HMAC_KEY_LEN, KDF_CONTEXT_LABEL, NONCE_PREFIX_LEN};
use crate::crypto::types::{CryptoError, DerivedKeyMaterial, MasterKey};
use crate::params::{Construction, StreamParams};
use crate::types::StreamError;

#[inline]
/// Summary: Build HKDF 'info' from the stream parameters and associated data.
fn build_info(params: &StreamParams, associated_data: &[u8]) -> Vec<u8> {
    let mut info = Vec::with_capacity(KDF_CONTEXT_LABEL.len() + 5 + associated_data.len());
    info.extend_from_slice(KDF_CONTEXT_LABEL);
    info.push(params.suite.id());
    info.extend_from_slice(&params.segment_size.to_be_bytes());
    info.extend_from_slice(associated_data);
    info
}

/// Total output length of the single expand call for these params.
#[inline]
pub fn key_material_len(params: &StreamParams) -> usize {
    let mac_len = match params.suite.construction() {
        Construction::CounterModeWithMac => HMAC_KEY_LEN,
        Construction::DirectAead => 0,
    };
    params.suite.key_len() + mac_len + NONCE_PREFIX_LEN
}

/// Summary: Derive the per-stream key material from master key, salt and AD.
///
/// Errors:
/// - `InvalidKeyMaterial` if the master key or salt length does not equal
///   the suite key length.
///
/// Deterministic: identical inputs always reproduce identical material,
/// which is what lets the reader mirror the writer.
pub fn derive_key_material(
    params: &StreamParams,
    master_key: &MasterKey,
    salt: &[u8],
    associated_data: &[u8],
) -> Result<DerivedKeyMaterial, StreamError> {
    let key_len = params.suite.key_len();
    if master_key.len() != key_len {
        return Err(StreamError::InvalidKeyMaterial(format!(
            "master key is {} bytes, {} requires {}",
            master_key.len(),
            params.suite,
            key_len
        )));
    }
    if salt.len() != params.suite.salt_len() {
        return Err(StreamError::InvalidKeyMaterial(format!(
            "salt is {} bytes, {} requires {}",
            salt.len(),
            params.suite,
            params.suite.salt_len()
        )));
    }

    let info = build_info(params, associated_data);
    let hk = Hkdf::<Sha256>::new(Some(salt), master_key.as_bytes());

    let mut okm = Zeroizing::new(vec![0u8; key_material_len(params)]);
    hk.expand(&info, &mut okm)
        .map_err(|_| CryptoError::Failure("HKDF expand failed (SHA-256)".into()))?;

    let (cipher_key, rest) = okm.split_at(key_len);
    let (mac_key, prefix) = rest.split_at(rest.len() - NONCE_PREFIX_LEN);

    let mut nonce_prefix = [0u8; NONCE_PREFIX_LEN];
    nonce_prefix.copy_from_slice(prefix);

    Ok(DerivedKeyMaterial {
        cipher_key: cipher_key.to_vec(),
        mac_key: mac_key.to_vec(),
        nonce_prefix,
    })
}
