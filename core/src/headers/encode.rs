//! src/headers/encode.rs
//!
//! Header encoding.
//!
//! Design notes:
//! - Field order must match `decode.rs` exactly.
//! - The encoded bytes are also the associated data of every segment, so the
//!   output must be canonical: one byte layout per header value.

use bytes::{BufMut, BytesMut};

use crate::headers::types::StreamHeader;

/// Serialize a header: `[version][salt][nonce prefix]`.
#[inline]
pub fn encode_header(h: &StreamHeader) -> Vec<u8> {
    let mut out = BytesMut::with_capacity(h.len());
    out.put_u8(h.version());
    out.put_slice(&h.salt);
    out.put_slice(&h.nonce_prefix);

    debug_assert_eq!(out.len(), h.len(), "encoding wrote incorrect length");
    out.to_vec()
}
