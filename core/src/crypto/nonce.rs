//! crypto/nonce.rs
//! Per-segment nonce construction.
//!
//! Layout (12 bytes):
//! `nonce_prefix (7) || segment_index (u32 BE) || last_flag (1)`
//!
//! Security notes:
//! - Within one stream the prefix is fixed, so (index, last) alone makes each
//!   nonce distinct. The last flag separates the final segment from a
//!   non-final segment with the same index, which is what detects truncation
//!   and extension.
//! - Indices beyond u32 are refused rather than wrapped.

use byteorder::{BigEndian, ByteOrder};

use crate::constants::{
    LAST_SEGMENT_FLAG, MAX_SEGMENTS, NONCE_PREFIX_LEN, NOT_LAST_SEGMENT_FLAG, SEGMENT_NONCE_LEN,
};
use crate::types::StreamError;

/// Build the 12-byte nonce of segment `index`.
#[inline]
pub fn segment_nonce(
    nonce_prefix: &[u8; NONCE_PREFIX_LEN],
    index: u64,
    last: bool,
) -> Result<[u8; SEGMENT_NONCE_LEN], StreamError> {
    let index = u32::try_from(index)
        .map_err(|_| StreamError::SegmentLimitExceeded { max: MAX_SEGMENTS })?;

    let mut nonce = [0u8; SEGMENT_NONCE_LEN];
    nonce[..NONCE_PREFIX_LEN].copy_from_slice(nonce_prefix);
    BigEndian::write_u32(&mut nonce[NONCE_PREFIX_LEN..NONCE_PREFIX_LEN + 4], index);
    nonce[SEGMENT_NONCE_LEN - 1] = if last { LAST_SEGMENT_FLAG } else { NOT_LAST_SEGMENT_FLAG };
    Ok(nonce)
}
