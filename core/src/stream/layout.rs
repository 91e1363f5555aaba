//! stream/layout.rs
//! Ciphertext geometry: pure arithmetic, no I/O.
//!
//! ```text
//! [ header ][ seg 0: segment_size + tag ][ seg 1 ] ... [ final: 0..segment_size + tag ]
//! ```
//!
//! The writer seals a segment as soon as it is full, so the final segment is
//! always strictly shorter than `segment_size` (possibly empty). Readers still
//! accept a full-size final segment.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentLayout {
    pub header_len: usize,
    pub segment_size: usize,
    pub tag_len: usize,
}

impl SegmentLayout {
    pub fn new(header_len: usize, segment_size: usize, tag_len: usize) -> Self {
        Self { header_len, segment_size, tag_len }
    }

    /// Ciphertext bytes of a full segment.
    #[inline]
    pub fn ciphertext_segment_size(&self) -> usize {
        self.segment_size + self.tag_len
    }

    /// Absolute ciphertext offset of segment `index`.
    #[inline]
    pub fn segment_offset(&self, index: u64) -> u64 {
        self.header_len as u64 + index * self.ciphertext_segment_size() as u64
    }

    /// Number of segments the writer emits for `plaintext_len` bytes.
    #[inline]
    pub fn segment_count(&self, plaintext_len: u64) -> u64 {
        plaintext_len / self.segment_size as u64 + 1
    }

    /// Total ciphertext length the writer produces for `plaintext_len` bytes.
    pub fn ciphertext_len(&self, plaintext_len: u64) -> u64 {
        self.header_len as u64
            + plaintext_len
            + self.segment_count(plaintext_len) * self.tag_len as u64
    }

    /// Plaintext length implied by a ciphertext length.
    /// `None` if no valid stream has this length. Not authenticated.
    pub fn plaintext_len(&self, ciphertext_len: u64) -> Option<u64> {
        let body = ciphertext_len.checked_sub(self.header_len as u64)?;
        let ct_seg = self.ciphertext_segment_size() as u64;

        let mut full = body / ct_seg;
        let mut rem = body % ct_seg;
        if rem == 0 && full > 0 {
            full -= 1;
            rem = ct_seg;
        }
        if rem < self.tag_len as u64 {
            return None;
        }
        Some(full * self.segment_size as u64 + rem - self.tag_len as u64)
    }

    /// Segment holding plaintext byte `offset`.
    #[inline]
    pub fn segment_for_offset(&self, offset: u64) -> u64 {
        offset / self.segment_size as u64
    }

    /// Offset of plaintext byte `offset` inside its segment.
    #[inline]
    pub fn offset_in_segment(&self, offset: u64) -> usize {
        (offset % self.segment_size as u64) as usize
    }
}
