//! Wire constants, size limits and labels shared by every layer.
//!
//! Anything that influences the byte layout or the key schedule lives here so
//! encoder and decoder can never disagree about it.

/// Length of the version byte that opens every stream header.
pub const VERSION_LEN: usize = 1;

/// Nonce prefix length carried in the header (bytes).
pub const NONCE_PREFIX_LEN: usize = 7;

/// Full per-segment nonce: prefix (7) + segment index (4, BE) + last flag (1).
pub const SEGMENT_NONCE_LEN: usize = NONCE_PREFIX_LEN + 4 + 1;

/// AES block size; the CTR IV is the segment nonce padded with a zero counter.
pub const CTR_IV_LEN: usize = 16;

/// Tag length of the direct AEAD suites (GCM, Poly1305).
pub const AEAD_TAG_LEN: usize = 16;

/// HMAC-SHA256 key length used by the counter-mode suites.
pub const HMAC_KEY_LEN: usize = 32;

/// Bounds for the truncated HMAC tag of the counter-mode suites.
pub const MIN_MAC_TAG_LEN: usize = 16;
pub const MAX_MAC_TAG_LEN: usize = 32;

/// Last-segment marker values folded into the nonce.
pub const LAST_SEGMENT_FLAG: u8 = 0x01;
pub const NOT_LAST_SEGMENT_FLAG: u8 = 0x00;

/// Defaults when the caller does not pick a segment size.
pub const DEFAULT_SEGMENT_SIZE: usize = 64 * 1024; // 64 KiB

/// Segment sizes must be powers of two inside this range.
pub const MIN_SEGMENT_SIZE: usize = 256;
pub const MAX_SEGMENT_SIZE: usize = 8 * 1024 * 1024; // 8 MiB

/// Industry-standard segment sizes used by the named presets.
pub const PRESET_SEGMENT_SIZES: &[usize] = &[
    4 * 1024,    // 4 KiB
    64 * 1024,   // 64 KiB
    1024 * 1024, // 1 MiB
];

/// Segment indices are encoded as u32 in the nonce.
pub const MAX_SEGMENTS: u64 = u32::MAX as u64 + 1;

/// HKDF info label. Binds derived keys to this construction and version.
pub const KDF_CONTEXT_LABEL: &[u8] = b"streaming-aead/v1/segment-keys";

/// Cipher suite identifiers (mirrored in the header version byte).
pub mod suite_ids {
    pub const AES128_CTR_HMAC_SHA256: u8 = 0x11;
    pub const AES256_CTR_HMAC_SHA256: u8 = 0x12;
    pub const AES128_GCM_HKDF: u8 = 0x21;
    pub const AES256_GCM_HKDF: u8 = 0x22;
    pub const CHACHA20_POLY1305_HKDF: u8 = 0x23;
}
