//! src/headers/decode.rs
//!
//! Header decoding.
//!
//! Design notes:
//! - The first byte selects the suite and with it the total header length.
//! - Trailing bytes after the header are left untouched; the caller gets the
//!   consumed length back and treats the rest as segment data.
//! - `HeaderAccumulator` buffers arbitrary chunk boundaries and decodes once
//!   the fixed length is available. It never blocks.

use crate::constants::{NONCE_PREFIX_LEN, VERSION_LEN};
use crate::headers::types::{HeaderError, StreamHeader};
use crate::params::CipherSuite;

/// Decode a header from the front of `buf`.
///
/// # Returns
/// - `Ok((header, consumed))` on success.
/// - `Err(HeaderError)` if the buffer is short or the version byte is unknown.
pub fn decode_header(buf: &[u8]) -> Result<(StreamHeader, usize), HeaderError> {
    let raw = *buf
        .first()
        .ok_or(HeaderError::BufferTooShort { have: 0, need: VERSION_LEN })?;
    let suite = CipherSuite::try_from(raw).map_err(|_| HeaderError::UnknownVersion { raw })?;

    let need = suite.header_len();
    if buf.len() < need {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need });
    }

    let salt_end = VERSION_LEN + suite.salt_len();
    let mut nonce_prefix = [0u8; NONCE_PREFIX_LEN];
    nonce_prefix.copy_from_slice(&buf[salt_end..need]);

    let header = StreamHeader::new(suite, &buf[VERSION_LEN..salt_end], nonce_prefix)?;
    Ok((header, need))
}

/// Decode and require the header to carry `expected` as its suite.
pub fn decode_header_for(
    buf: &[u8],
    expected: CipherSuite,
) -> Result<(StreamHeader, usize), HeaderError> {
    if let Some(&raw) = buf.first() {
        let have = CipherSuite::try_from(raw).map_err(|_| HeaderError::UnknownVersion { raw })?;
        if have != expected {
            return Err(HeaderError::SuiteMismatch { have, expected });
        }
    }
    decode_header(buf)
}

/// Incremental header parser for sources with unknown chunk boundaries.
#[derive(Debug, Clone)]
pub struct HeaderAccumulator {
    suite: CipherSuite,
    buf: Vec<u8>,
}

impl HeaderAccumulator {
    pub fn new(suite: CipherSuite) -> Self {
        Self { suite, buf: Vec::with_capacity(suite.header_len()) }
    }

    /// Bytes still needed before the header can be decoded.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.suite.header_len() - self.buf.len()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Buffer as much of `chunk` as the header still needs.
    /// Returns the number of bytes taken from `chunk`.
    pub fn push(&mut self, chunk: &[u8]) -> usize {
        let take = self.remaining().min(chunk.len());
        self.buf.extend_from_slice(&chunk[..take]);
        take
    }

    /// Raw header bytes buffered so far.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Decode the buffered header atomically.
    pub fn finish(&self) -> Result<StreamHeader, HeaderError> {
        if !self.is_complete() {
            return Err(HeaderError::Incomplete {
                have: self.buf.len(),
                need: self.suite.header_len(),
            });
        }
        let (header, _) = decode_header_for(&self.buf, self.suite)?;
        Ok(header)
    }
}
