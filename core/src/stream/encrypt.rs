//! stream/encrypt.rs
//! `EncryptingWriter`: plaintext in, header + sealed segments out.
//!
//! State machine:
//! `Created -> HeaderEmitted -> Streaming -> Closed`, with `Failed` reachable
//! from any non-terminal state.
//!
//! Design:
//! - Key derivation and header encoding happen in the constructor; the header
//!   is the first thing `take_output` returns.
//! - A segment is sealed as soon as the plaintext buffer reaches the segment
//!   size. `close` seals whatever is left (possibly nothing) as the final
//!   segment, so an exact multiple of the segment size ends in an empty final
//!   segment and an empty stream is one empty final segment.
//! - The last index (`MAX_SEGMENTS - 1`) is reserved for the final segment.
//!   A full buffer at that index is held until `close`; more data after it
//!   fails with `SegmentLimitExceeded`.
//! - Memory: one segment of plaintext plus whatever sealed output the caller
//!   has not taken yet.

use std::fmt;

use bytes::{Bytes, BytesMut};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, trace, warn};

use crate::constants::MAX_SEGMENTS;
use crate::crypto::{derive_key_material, segment_nonce, MasterKey, SegmentCipher};
use crate::headers::{encode_header, StreamHeader};
use crate::params::StreamParams;
use crate::stream::layout::SegmentLayout;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Created,
    HeaderEmitted,
    Streaming,
    Closed,
    Failed,
}

pub struct EncryptingWriter {
    params: StreamParams,
    layout: SegmentLayout,
    cipher: SegmentCipher,
    header: StreamHeader,
    header_bytes: Vec<u8>,
    buffer: Vec<u8>,
    output: BytesMut,
    next_index: u64,
    state: WriterState,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl fmt::Debug for EncryptingWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptingWriter")
            .field("params", &self.params)
            .field("header", &self.header.summary())
            .field("buffered", &self.buffer.len())
            .field("pending_output", &self.output.len())
            .field("next_index", &self.next_index)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl EncryptingWriter {
    /// New writer with a fresh random salt.
    pub fn new(
        params: StreamParams,
        master_key: &MasterKey,
        associated_data: &[u8],
    ) -> Result<Self, StreamError> {
        let mut salt = vec![0u8; params.suite.salt_len()];
        OsRng.fill_bytes(&mut salt);
        Self::with_salt(params, master_key, associated_data, &salt)
    }

    /// New writer with a caller-chosen salt.
    ///
    /// Reusing a salt under the same key and associated data reuses every
    /// segment nonce. Only deterministic tests should call this directly.
    pub fn with_salt(
        params: StreamParams,
        master_key: &MasterKey,
        associated_data: &[u8],
        salt: &[u8],
    ) -> Result<Self, StreamError> {
        params.validate()?;
        let mut timer = TelemetryTimer::new();

        let material = timer.time(Stage::Derive, || {
            derive_key_material(&params, master_key, salt, associated_data)
        })?;
        let cipher = SegmentCipher::new(&params, &material)?;
        let header = StreamHeader::new(params.suite, salt, material.nonce_prefix)?;
        let header_bytes = encode_header(&header);

        let mut w = Self {
            params,
            layout: params.layout(),
            cipher,
            header,
            header_bytes,
            buffer: Vec::with_capacity(params.segment_size()),
            output: BytesMut::with_capacity(params.header_len() + params.ciphertext_segment_size()),
            next_index: 0,
            state: WriterState::Created,
            counters: TelemetryCounters::default(),
            timer,
        };

        w.output.extend_from_slice(&w.header_bytes);
        w.counters.add_header(w.header_bytes.len());
        w.state = WriterState::HeaderEmitted;
        debug!(
            suite = %w.params.suite,
            segment_size = w.params.segment_size,
            tag_len = w.params.tag_len,
            "encrypting writer ready"
        );
        Ok(w)
    }

    /// Append plaintext. Full segments are sealed immediately.
    pub fn write(&mut self, mut data: &[u8]) -> Result<(), StreamError> {
        match self.state {
            WriterState::Closed => return Err(StreamError::StreamClosed),
            WriterState::Failed => return Err(StreamError::Terminated),
            _ => {}
        }
        self.state = WriterState::Streaming;

        let seg = self.params.segment_size();
        while !data.is_empty() {
            if self.buffer.len() == seg {
                let e = StreamError::SegmentLimitExceeded { max: MAX_SEGMENTS };
                warn!(index = self.next_index, error = %e, "no index left for more data, writer terminated");
                self.state = WriterState::Failed;
                return Err(e);
            }
            let take = (seg - self.buffer.len()).min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buffer.len() == seg && self.next_index + 1 < MAX_SEGMENTS {
                self.seal_buffered(false)?;
            }
        }
        Ok(())
    }

    /// Drain ciphertext produced so far.
    pub fn take_output(&mut self) -> Bytes {
        self.output.split().freeze()
    }

    /// Bytes ready in the output buffer.
    #[inline]
    pub fn pending_output(&self) -> usize {
        self.output.len()
    }

    /// Seal the final segment and return every byte not yet taken.
    pub fn close(&mut self) -> Result<Bytes, StreamError> {
        match self.state {
            WriterState::Closed => return Err(StreamError::AlreadyClosed),
            WriterState::Failed => return Err(StreamError::Terminated),
            _ => {}
        }
        self.seal_buffered(true)?;
        self.state = WriterState::Closed;
        self.timer.finish();
        debug!(
            segments = self.next_index,
            plaintext = self.counters.bytes_plaintext,
            "encrypting writer closed"
        );
        Ok(self.take_output())
    }

    fn seal_buffered(&mut self, last: bool) -> Result<(), StreamError> {
        let index = self.next_index;
        match self.seal_segment(index, last) {
            Ok(ct) => {
                trace!(index, last, pt_len = self.buffer.len(), "segment sealed");
                self.counters.add_segment(self.buffer.len(), self.params.tag_len());
                self.output.extend_from_slice(&ct);
                self.buffer.clear();
                self.next_index += 1;
                Ok(())
            }
            Err(e) => {
                warn!(index, error = %e, "sealing failed, writer terminated");
                self.state = WriterState::Failed;
                Err(e)
            }
        }
    }

    fn seal_segment(&mut self, index: u64, last: bool) -> Result<Vec<u8>, StreamError> {
        if index >= MAX_SEGMENTS {
            return Err(StreamError::SegmentLimitExceeded { max: MAX_SEGMENTS });
        }
        let nonce = segment_nonce(&self.header.nonce_prefix, index, last)?;
        let (cipher, header_bytes, buffer) = (&self.cipher, &self.header_bytes, &self.buffer);
        let ct = self
            .timer
            .time(Stage::Encrypt, || cipher.seal(&nonce, header_bytes, buffer))?;
        Ok(ct)
    }

    // ---- inspection ----

    #[inline]
    pub fn state(&self) -> WriterState {
        self.state
    }

    #[inline]
    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    #[inline]
    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    /// Segments sealed so far.
    #[inline]
    pub fn segments_written(&self) -> u64 {
        self.next_index
    }

    /// Ciphertext length this writer produces for `plaintext_len` bytes in total.
    #[inline]
    pub fn expected_ciphertext_len(&self, plaintext_len: u64) -> u64 {
        self.layout.ciphertext_len(plaintext_len)
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters, &self.timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CipherSuite;

    fn writer_at_last_index() -> EncryptingWriter {
        let p = StreamParams::new(CipherSuite::Aes128GcmHkdf, 1024).unwrap();
        let mut w = EncryptingWriter::new(p, &MasterKey::new(&[3u8; 16]), b"").unwrap();
        w.take_output();
        w.next_index = MAX_SEGMENTS - 1;
        w
    }

    #[test]
    fn full_segment_at_last_index_is_held_for_close() {
        let mut w = writer_at_last_index();
        w.write(&[1u8; 1024]).unwrap();
        assert_eq!(w.pending_output(), 0);
        assert_eq!(w.segments_written(), MAX_SEGMENTS - 1);

        let tail = w.close().unwrap();
        assert_eq!(tail.len(), w.params().ciphertext_segment_size());
        assert_eq!(w.segments_written(), MAX_SEGMENTS);
        assert_eq!(w.state(), WriterState::Closed);
    }

    #[test]
    fn data_past_last_index_is_refused() {
        let mut w = writer_at_last_index();
        let err = w.write(&[1u8; 1025]).unwrap_err();
        assert!(matches!(err, StreamError::SegmentLimitExceeded { .. }));
        assert_eq!(w.state(), WriterState::Failed);
        assert!(matches!(w.close(), Err(StreamError::Terminated)));
    }

    #[test]
    fn debug_does_not_expose_buffered_plaintext() {
        let mut w = writer_at_last_index();
        w.write(b"secret plaintext").unwrap();
        let s = format!("{:?}", w);
        assert!(s.contains("buffered: 16"));
        assert!(!s.contains("secret"));
    }
}
