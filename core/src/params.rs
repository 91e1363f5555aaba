//! params.rs
//! Stream parameters handed to the core by the key-management layer.
//!
//! Design notes:
//! - `CipherSuite` is a closed registry; its id doubles as the header version byte.
//! - `StreamParams` is validated once, at writer/reader construction.
//! - Presets mirror the usual key templates (suite + segment size + tag length)
//!   and are looked up by name through an explicit table.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::constants::{
    suite_ids, AEAD_TAG_LEN, DEFAULT_SEGMENT_SIZE, MAX_MAC_TAG_LEN, MAX_SEGMENT_SIZE,
    MIN_MAC_TAG_LEN, MIN_SEGMENT_SIZE, NONCE_PREFIX_LEN, VERSION_LEN,
};
use crate::stream::layout::SegmentLayout;
use crate::types::StreamError;

/// The two segment constructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construction {
    /// Block cipher in counter mode + truncated HMAC-SHA256 tag.
    CounterModeWithMac,
    /// AEAD cipher keyed with a per-stream derived subkey.
    DirectAead,
}

/// Cipher suites (header registry).
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CipherSuite {
    Aes128CtrHmacSha256 = suite_ids::AES128_CTR_HMAC_SHA256,
    Aes256CtrHmacSha256 = suite_ids::AES256_CTR_HMAC_SHA256,
    Aes128GcmHkdf = suite_ids::AES128_GCM_HKDF,
    Aes256GcmHkdf = suite_ids::AES256_GCM_HKDF,
    #[serde(rename = "CHACHA20_POLY1305_HKDF")]
    ChaCha20Poly1305Hkdf = suite_ids::CHACHA20_POLY1305_HKDF,
}

impl CipherSuite {
    pub const ALL: [CipherSuite; 5] = [
        CipherSuite::Aes128CtrHmacSha256,
        CipherSuite::Aes256CtrHmacSha256,
        CipherSuite::Aes128GcmHkdf,
        CipherSuite::Aes256GcmHkdf,
        CipherSuite::ChaCha20Poly1305Hkdf,
    ];

    #[inline]
    pub fn id(self) -> u8 {
        self.into()
    }

    pub fn construction(self) -> Construction {
        match self {
            CipherSuite::Aes128CtrHmacSha256 | CipherSuite::Aes256CtrHmacSha256 => {
                Construction::CounterModeWithMac
            }
            CipherSuite::Aes128GcmHkdf
            | CipherSuite::Aes256GcmHkdf
            | CipherSuite::ChaCha20Poly1305Hkdf => Construction::DirectAead,
        }
    }

    /// Cipher key length. Also the required master key and salt length.
    pub fn key_len(self) -> usize {
        match self {
            CipherSuite::Aes128CtrHmacSha256 | CipherSuite::Aes128GcmHkdf => 16,
            CipherSuite::Aes256CtrHmacSha256
            | CipherSuite::Aes256GcmHkdf
            | CipherSuite::ChaCha20Poly1305Hkdf => 32,
        }
    }

    #[inline]
    pub fn salt_len(self) -> usize {
        self.key_len()
    }

    /// Fixed header length: version byte + salt + nonce prefix.
    #[inline]
    pub fn header_len(self) -> usize {
        VERSION_LEN + self.salt_len() + NONCE_PREFIX_LEN
    }

    /// Tag length used when the caller does not pick one.
    pub fn default_tag_len(self) -> usize {
        match self.construction() {
            Construction::CounterModeWithMac => MAX_MAC_TAG_LEN,
            Construction::DirectAead => AEAD_TAG_LEN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CipherSuite::Aes128CtrHmacSha256 => "AES128_CTR_HMAC_SHA256",
            CipherSuite::Aes256CtrHmacSha256 => "AES256_CTR_HMAC_SHA256",
            CipherSuite::Aes128GcmHkdf => "AES128_GCM_HKDF",
            CipherSuite::Aes256GcmHkdf => "AES256_GCM_HKDF",
            CipherSuite::ChaCha20Poly1305Hkdf => "CHACHA20_POLY1305_HKDF",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters fixed for the lifetime of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    pub suite: CipherSuite,
    /// Plaintext bytes per non-final segment. Power of two.
    pub segment_size: u32,
    /// Tag bytes appended to every segment.
    pub tag_len: u8,
}

impl StreamParams {
    /// Validated params with the suite's default tag length.
    pub fn new(suite: CipherSuite, segment_size: usize) -> Result<Self, StreamError> {
        Self::with_tag_len(suite, segment_size, suite.default_tag_len())
    }

    pub fn with_tag_len(
        suite: CipherSuite,
        segment_size: usize,
        tag_len: usize,
    ) -> Result<Self, StreamError> {
        validate_segment_size(segment_size)?;
        validate_tag_len(suite, tag_len)?;
        Ok(Self {
            suite,
            segment_size: segment_size as u32,
            tag_len: tag_len as u8,
        })
    }

    /// Re-check invariants; deserialized params skip the constructors.
    pub fn validate(&self) -> Result<(), StreamError> {
        validate_segment_size(self.segment_size as usize)?;
        validate_tag_len(self.suite, self.tag_len as usize)
    }

    #[inline]
    pub fn segment_size(&self) -> usize {
        self.segment_size as usize
    }

    #[inline]
    pub fn tag_len(&self) -> usize {
        self.tag_len as usize
    }

    #[inline]
    pub fn header_len(&self) -> usize {
        self.suite.header_len()
    }

    /// Ciphertext bytes of a full (non-final) segment.
    #[inline]
    pub fn ciphertext_segment_size(&self) -> usize {
        self.segment_size() + self.tag_len()
    }

    pub fn layout(&self) -> SegmentLayout {
        SegmentLayout::new(self.header_len(), self.segment_size(), self.tag_len())
    }

    pub fn to_json(&self) -> Result<String, StreamError> {
        serde_json::to_string(self)
            .map_err(|e| StreamError::InvalidParameters(format!("serialize params: {}", e)))
    }

    pub fn from_json(s: &str) -> Result<Self, StreamError> {
        let params: StreamParams = serde_json::from_str(s)
            .map_err(|e| StreamError::InvalidParameters(format!("parse params: {}", e)))?;
        params.validate()?;
        Ok(params)
    }
}

impl Default for StreamParams {
    /// AES-256-GCM with HKDF, 64 KiB segments.
    fn default() -> Self {
        Self {
            suite: CipherSuite::Aes256GcmHkdf,
            segment_size: DEFAULT_SEGMENT_SIZE as u32,
            tag_len: AEAD_TAG_LEN as u8,
        }
    }
}

fn validate_segment_size(segment_size: usize) -> Result<(), StreamError> {
    if !segment_size.is_power_of_two() {
        return Err(StreamError::InvalidParameters(format!(
            "segment size {} is not a power of two",
            segment_size
        )));
    }
    if !(MIN_SEGMENT_SIZE..=MAX_SEGMENT_SIZE).contains(&segment_size) {
        return Err(StreamError::InvalidParameters(format!(
            "segment size {} outside [{}, {}]",
            segment_size, MIN_SEGMENT_SIZE, MAX_SEGMENT_SIZE
        )));
    }
    Ok(())
}

fn validate_tag_len(suite: CipherSuite, tag_len: usize) -> Result<(), StreamError> {
    let ok = match suite.construction() {
        Construction::DirectAead => tag_len == AEAD_TAG_LEN,
        Construction::CounterModeWithMac => (MIN_MAC_TAG_LEN..=MAX_MAC_TAG_LEN).contains(&tag_len),
    };
    if !ok {
        return Err(StreamError::InvalidParameters(format!(
            "tag length {} not supported by {}",
            tag_len, suite
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Named presets
// ---------------------------------------------------------------------------

const fn preset(suite: CipherSuite, segment_size: u32, tag_len: u8) -> StreamParams {
    StreamParams { suite, segment_size, tag_len }
}

pub const AES128_GCM_HKDF_4KB: StreamParams = preset(CipherSuite::Aes128GcmHkdf, 4 * 1024, 16);
pub const AES128_GCM_HKDF_1MB: StreamParams = preset(CipherSuite::Aes128GcmHkdf, 1024 * 1024, 16);
pub const AES256_GCM_HKDF_4KB: StreamParams = preset(CipherSuite::Aes256GcmHkdf, 4 * 1024, 16);
pub const AES256_GCM_HKDF_1MB: StreamParams = preset(CipherSuite::Aes256GcmHkdf, 1024 * 1024, 16);
pub const CHACHA20_POLY1305_HKDF_64KB: StreamParams =
    preset(CipherSuite::ChaCha20Poly1305Hkdf, 64 * 1024, 16);
pub const AES128_CTR_HMAC_SHA256_4KB: StreamParams =
    preset(CipherSuite::Aes128CtrHmacSha256, 4 * 1024, 32);
pub const AES128_CTR_HMAC_SHA256_1MB: StreamParams =
    preset(CipherSuite::Aes128CtrHmacSha256, 1024 * 1024, 32);
pub const AES256_CTR_HMAC_SHA256_4KB: StreamParams =
    preset(CipherSuite::Aes256CtrHmacSha256, 4 * 1024, 32);
pub const AES256_CTR_HMAC_SHA256_1MB: StreamParams =
    preset(CipherSuite::Aes256CtrHmacSha256, 1024 * 1024, 32);

/// Preset table, populated at compile time and consulted by the outer layer only.
pub const PRESETS: &[(&str, StreamParams)] = &[
    ("AES128_GCM_HKDF_4KB", AES128_GCM_HKDF_4KB),
    ("AES128_GCM_HKDF_1MB", AES128_GCM_HKDF_1MB),
    ("AES256_GCM_HKDF_4KB", AES256_GCM_HKDF_4KB),
    ("AES256_GCM_HKDF_1MB", AES256_GCM_HKDF_1MB),
    ("CHACHA20_POLY1305_HKDF_64KB", CHACHA20_POLY1305_HKDF_64KB),
    ("AES128_CTR_HMAC_SHA256_4KB", AES128_CTR_HMAC_SHA256_4KB),
    ("AES128_CTR_HMAC_SHA256_1MB", AES128_CTR_HMAC_SHA256_1MB),
    ("AES256_CTR_HMAC_SHA256_4KB", AES256_CTR_HMAC_SHA256_4KB),
    ("AES256_CTR_HMAC_SHA256_1MB", AES256_CTR_HMAC_SHA256_1MB),
];

/// Look up a preset by name (case-insensitive).
pub fn preset_by_name(name: &str) -> Option<StreamParams> {
    PRESETS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, p)| *p)
}
