//! crypto/ctr_hmac.rs
//! Counter-mode-with-MAC segment cipher: AES-CTR + HMAC-SHA256.
//!
//! Design:
//! - Keystream: AES-CTR with IV = segment nonce (12) || 0u32 (big-endian counter).
//! - Tag: HMAC-SHA256(mac_key, header || segment nonce || ciphertext),
//!   truncated to the configured tag length (16..=32), appended.
//! - Encrypt-then-MAC; `open` verifies before touching the ciphertext.
//!
//! Security notes:
//! - Tag comparison goes through `Mac::verify_truncated_left` (constant time).
//! - A segment never exceeds 8 MiB, so the 32-bit block counter cannot wrap.

use aes::{Aes128, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::constants::{CTR_IV_LEN, MAX_MAC_TAG_LEN, MIN_MAC_TAG_LEN, SEGMENT_NONCE_LEN};
use crate::crypto::types::CryptoError;
use crate::params::CipherSuite;

type HmacSha256 = Hmac<Sha256>;
type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AesWidth {
    Aes128,
    Aes256,
}

/// AES-CTR + truncated HMAC-SHA256, keyed once per stream.
#[derive(Clone)]
pub struct CtrHmac {
    width: AesWidth,
    cipher_key: Zeroizing<Vec<u8>>,
    mac: HmacSha256,
    tag_len: usize,
}

impl CtrHmac {
    pub fn new(
        suite: CipherSuite,
        cipher_key: &[u8],
        mac_key: &[u8],
        tag_len: usize,
    ) -> Result<Self, CryptoError> {
        let width = match suite {
            CipherSuite::Aes128CtrHmacSha256 => AesWidth::Aes128,
            CipherSuite::Aes256CtrHmacSha256 => AesWidth::Aes256,
            other => return Err(CryptoError::Failure(format!("{} is not a counter-mode suite", other))),
        };
        if cipher_key.len() != suite.key_len() {
            return Err(CryptoError::InvalidKeyLen { expected: suite.key_len(), actual: cipher_key.len() });
        }
        if !(MIN_MAC_TAG_LEN..=MAX_MAC_TAG_LEN).contains(&tag_len) {
            return Err(CryptoError::Failure(format!("unsupported HMAC tag length {}", tag_len)));
        }
        let mac = HmacSha256::new_from_slice(mac_key)
            .map_err(|_| CryptoError::InvalidKeyLen { expected: 32, actual: mac_key.len() })?;

        Ok(Self {
            width,
            cipher_key: Zeroizing::new(cipher_key.to_vec()),
            mac,
            tag_len,
        })
    }

    #[inline]
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    pub fn seal(&self, nonce_12: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = Vec::with_capacity(plaintext.len() + self.tag_len);
        out.extend_from_slice(plaintext);
        self.apply_keystream(nonce_12, &mut out)?;

        let tag = self.compute_mac(nonce_12, aad, &out).finalize().into_bytes();
        out.extend_from_slice(&tag[..self.tag_len]);
        Ok(out)
    }

    pub fn open(&self, nonce_12: &[u8], aad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext_and_tag.len() < self.tag_len {
            return Err(CryptoError::CiphertextTooShort {
                len: ciphertext_and_tag.len(),
                tag_len: self.tag_len,
            });
        }
        let (ct, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - self.tag_len);

        self.compute_mac(nonce_12, aad, ct)
            .verify_truncated_left(tag)
            .map_err(|_| CryptoError::TagMismatch)?;

        let mut pt = ct.to_vec();
        self.apply_keystream(nonce_12, &mut pt)?;
        Ok(pt)
    }

    fn compute_mac(&self, nonce_12: &[u8], aad: &[u8], ct: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(aad);
        mac.update(nonce_12);
        mac.update(ct);
        mac
    }

    fn apply_keystream(&self, nonce_12: &[u8], buf: &mut [u8]) -> Result<(), CryptoError> {
        if nonce_12.len() != SEGMENT_NONCE_LEN {
            return Err(CryptoError::InvalidNonceLen { expected: SEGMENT_NONCE_LEN, actual: nonce_12.len() });
        }
        let mut iv = [0u8; CTR_IV_LEN];
        iv[..SEGMENT_NONCE_LEN].copy_from_slice(nonce_12);

        let bad_len = |_| CryptoError::InvalidKeyLen { expected: self.cipher_key.len(), actual: self.cipher_key.len() };
        match self.width {
            AesWidth::Aes128 => Aes128Ctr::new_from_slices(&self.cipher_key, &iv)
                .map_err(bad_len)?
                .apply_keystream(buf),
            AesWidth::Aes256 => Aes256Ctr::new_from_slices(&self.cipher_key, &iv)
                .map_err(bad_len)?
                .apply_keystream(buf),
        }
        Ok(())
    }
}
