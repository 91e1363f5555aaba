//! stream/decrypt.rs
//! `DecryptingReader`: ciphertext source in, verified plaintext segments out.
//!
//! State machine:
//! `Created -> HeaderPending -> Streaming -> Exhausted | Failed`
//!
//! Design:
//! - The header is read in full and checked before any segment. The nonce
//!   prefix it carries must equal the one derived from (key, salt, AD), which
//!   rejects a wrong key or wrong associated data up front.
//! - The final segment is found by end of input: the reader asks for one byte
//!   more than a full ciphertext segment. If it gets it, the segment is
//!   non-final and the extra byte is carried over; otherwise the segment is
//!   final.
//! - End of input at a segment boundary without a final segment is
//!   `TruncatedStream`; everything before the cut is still returned.
//! - A segment is released only after its tag verifies. Segments released
//!   before a failure stay valid.
//! - Any error moves the reader to `Failed`; later calls return `Terminated`.
//!
//! Random access (`R: Read + Seek`): the ciphertext must start at offset 0 of
//! the source. Seeking skips verification of earlier segments.

use std::io::{Read, Seek, SeekFrom};

use subtle::ConstantTimeEq;
use tracing::{debug, trace, warn};

use crate::constants::MAX_SEGMENTS;
use crate::crypto::{derive_key_material, segment_nonce, MasterKey, SegmentCipher};
use crate::headers::{HeaderAccumulator, HeaderError, StreamHeader};
use crate::params::StreamParams;
use crate::stream::layout::SegmentLayout;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{AuthScope, StreamError};
use crate::utils::read_exact_or_eof;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Created,
    HeaderPending,
    Streaming,
    Exhausted,
    Failed,
}

/// Header-dependent state, present once the header has been validated.
struct Session {
    header: StreamHeader,
    header_bytes: Vec<u8>,
    cipher: SegmentCipher,
}

pub struct DecryptingReader<'k, R> {
    params: StreamParams,
    layout: SegmentLayout,
    master_key: &'k MasterKey,
    associated_data: Vec<u8>,
    source: R,
    session: Option<Session>,
    next_index: u64,
    lookahead: Option<u8>,
    state: ReaderState,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl<'k, R: Read> DecryptingReader<'k, R> {
    /// New reader. Parameters and key length are checked here; the header is
    /// read lazily by the first `read_segment`.
    pub fn new(
        params: StreamParams,
        master_key: &'k MasterKey,
        associated_data: &[u8],
        source: R,
    ) -> Result<Self, StreamError> {
        params.validate()?;
        if master_key.len() != params.suite.key_len() {
            return Err(StreamError::InvalidKeyMaterial(format!(
                "master key is {} bytes, {} requires {}",
                master_key.len(),
                params.suite,
                params.suite.key_len()
            )));
        }
        Ok(Self {
            params,
            layout: params.layout(),
            master_key,
            associated_data: associated_data.to_vec(),
            source,
            session: None,
            next_index: 0,
            lookahead: None,
            state: ReaderState::Created,
            counters: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
        })
    }

    /// Next verified plaintext segment, `None` once the final segment has
    /// been returned.
    pub fn read_segment(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        match self.state {
            ReaderState::Failed => return Err(StreamError::Terminated),
            ReaderState::Exhausted => return Ok(None),
            ReaderState::Created | ReaderState::HeaderPending => self.ensure_header()?,
            ReaderState::Streaming => {}
        }
        let result = self.read_next();
        self.guard(result)
    }

    /// Read and validate the header if that has not happened yet.
    pub fn ensure_header(&mut self) -> Result<(), StreamError> {
        match self.state {
            ReaderState::Failed => return Err(StreamError::Terminated),
            ReaderState::Created | ReaderState::HeaderPending => {}
            _ => return Ok(()),
        }
        self.state = ReaderState::HeaderPending;
        let result = self.load_header();
        self.guard(result)?;
        self.state = ReaderState::Streaming;
        Ok(())
    }

    fn load_header(&mut self) -> Result<(), StreamError> {
        let mut acc = HeaderAccumulator::new(self.params.suite);
        let mut chunk = vec![0u8; acc.remaining()];
        while !acc.is_complete() {
            let want = acc.remaining();
            let n = read_exact_or_eof(&mut self.source, &mut chunk[..want])?;
            if n == 0 {
                return Err(StreamError::MalformedHeader(HeaderError::BufferTooShort {
                    have: acc.buffered().len(),
                    need: self.params.header_len(),
                }));
            }
            acc.push(&chunk[..n]);
        }
        let header = acc.finish()?;
        let header_bytes = acc.buffered().to_vec();

        let (params, key, ad) = (&self.params, self.master_key, &self.associated_data);
        let material = self
            .timer
            .time(Stage::Derive, || derive_key_material(params, key, &header.salt, ad))?;

        if !bool::from(material.nonce_prefix[..].ct_eq(&header.nonce_prefix[..])) {
            warn!("header nonce prefix mismatch (wrong key or associated data)");
            return Err(StreamError::AuthenticationFailure(AuthScope::Header));
        }

        let cipher = SegmentCipher::new(&self.params, &material)?;
        debug!(header = %header.summary(), "stream header accepted");

        self.counters.add_header(header_bytes.len());
        self.session = Some(Session { header, header_bytes, cipher });
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        let index = self.next_index;
        if index >= MAX_SEGMENTS {
            return Err(StreamError::SegmentLimitExceeded { max: MAX_SEGMENTS });
        }

        let ct_seg = self.layout.ciphertext_segment_size();
        let tag_len = self.params.tag_len();

        // One byte of look-ahead beyond a full segment decides finality.
        let mut buf = vec![0u8; ct_seg + 1];
        let mut have = 0;
        if let Some(b) = self.lookahead.take() {
            buf[0] = b;
            have = 1;
        }
        let (source, tail) = (&mut self.source, &mut buf[have..]);
        let n = self.timer.time(Stage::Read, || read_exact_or_eof(source, tail))?;
        have += n;

        if have == ct_seg + 1 {
            self.lookahead = Some(buf[ct_seg]);
            buf.truncate(ct_seg);
            let pt = self
                .open(index, false, &buf)
                .map_err(|_| StreamError::AuthenticationFailure(AuthScope::Segment(index)))?;
            self.accept(index, false, pt).map(Some)
        } else {
            buf.truncate(have);
            if have < tag_len {
                return Err(StreamError::TruncatedStream { segment_index: index });
            }
            match self.open(index, true, &buf) {
                Ok(pt) => self.accept(index, true, pt).map(Some),
                // A full-size segment that verifies as non-final is genuine; the
                // stream was cut right after it. Release it; the next call hits
                // end of input and reports the truncation.
                Err(_) if have == ct_seg => match self.open(index, false, &buf) {
                    Ok(pt) => self.accept(index, false, pt).map(Some),
                    Err(_) => Err(StreamError::AuthenticationFailure(AuthScope::Segment(index))),
                },
                Err(_) => Err(StreamError::AuthenticationFailure(AuthScope::Segment(index))),
            }
        }
    }

    fn open(&mut self, index: u64, last: bool, ct: &[u8]) -> Result<Vec<u8>, StreamError> {
        let session = self.session.as_ref().ok_or(StreamError::Terminated)?;
        let nonce = segment_nonce(&session.header.nonce_prefix, index, last)?;
        let pt = self.timer.time(Stage::Decrypt, || {
            session.cipher.open(&nonce, &session.header_bytes, ct)
        })?;
        Ok(pt)
    }

    fn accept(&mut self, index: u64, last: bool, pt: Vec<u8>) -> Result<Vec<u8>, StreamError> {
        trace!(index, last, pt_len = pt.len(), "segment verified");
        self.counters.add_segment(pt.len(), self.params.tag_len());
        self.next_index = index + 1;
        if last {
            self.state = ReaderState::Exhausted;
            self.timer.finish();
            debug!(segments = self.next_index, "decrypting reader exhausted");
        }
        Ok(pt)
    }

    /// Move to `Failed` on any error.
    fn guard<T>(&mut self, result: Result<T, StreamError>) -> Result<T, StreamError> {
        if let Err(e) = &result {
            if e.is_integrity_failure() {
                warn!(index = self.next_index, error = %e, "stream rejected");
            } else {
                debug!(error = %e, "decrypting reader failed");
            }
            self.state = ReaderState::Failed;
            self.lookahead = None;
        }
        result
    }

    // ---- inspection ----

    #[inline]
    pub fn state(&self) -> ReaderState {
        self.state
    }

    #[inline]
    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    /// Header, once validated.
    pub fn header(&self) -> Option<&StreamHeader> {
        self.session.as_ref().map(|s| &s.header)
    }

    /// Index of the segment the next `read_segment` returns.
    #[inline]
    pub fn next_segment_index(&self) -> u64 {
        self.next_index
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters, &self.timer)
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<'k, R: Read + Seek> DecryptingReader<'k, R> {
    /// Position the reader at segment `index`. The next `read_segment`
    /// returns that segment. Allowed after `Exhausted`, refused after `Failed`.
    pub fn seek_to_segment(&mut self, index: u64) -> Result<(), StreamError> {
        if self.state == ReaderState::Failed {
            return Err(StreamError::Terminated);
        }
        if index >= MAX_SEGMENTS {
            return Err(StreamError::SegmentLimitExceeded { max: MAX_SEGMENTS });
        }
        self.ensure_header_at_start()?;

        let offset = self.layout.segment_offset(index);
        let result = self.source.seek(SeekFrom::Start(offset)).map_err(StreamError::from);
        self.guard(result)?;

        trace!(index, offset, "seek to segment");
        self.next_index = index;
        self.lookahead = None;
        self.state = ReaderState::Streaming;
        Ok(())
    }

    /// Seek to `index` and read that segment.
    pub fn read_segment_at(&mut self, index: u64) -> Result<Option<Vec<u8>>, StreamError> {
        self.seek_to_segment(index)?;
        self.read_segment()
    }

    /// Plaintext length implied by the source length. Not authenticated:
    /// reading the final segment is what proves it.
    pub fn plaintext_len(&mut self) -> Result<u64, StreamError> {
        if self.state == ReaderState::Failed {
            return Err(StreamError::Terminated);
        }
        self.ensure_header_at_start()?;

        let result = self.source_len();
        let total = self.guard(result)?;
        match self.layout.plaintext_len(total) {
            Some(n) => Ok(n),
            None => {
                let body = total.saturating_sub(self.params.header_len() as u64);
                let segment_index = body / self.layout.ciphertext_segment_size() as u64;
                let result: Result<u64, StreamError> =
                    Err(StreamError::TruncatedStream { segment_index });
                self.guard(result)
            }
        }
    }

    /// Decrypt up to `len` plaintext bytes starting at `offset`, touching only
    /// the covering segments. Reads past the end are clamped.
    pub fn read_range(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, StreamError> {
        let total = self.plaintext_len()?;
        let end = offset.saturating_add(len as u64).min(total);
        if offset >= end {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity((end - offset) as usize);
        let mut index = self.layout.segment_for_offset(offset);
        self.seek_to_segment(index)?;

        while (out.len() as u64) < end - offset {
            let seg_start = index * self.params.segment_size() as u64;
            let pt = self
                .read_segment()?
                .ok_or(StreamError::TruncatedStream { segment_index: index })?;

            let from = offset.saturating_sub(seg_start) as usize;
            let to = ((end - seg_start) as usize).min(pt.len());
            if from < to {
                out.extend_from_slice(&pt[from..to]);
            }
            if to < self.params.segment_size() && (out.len() as u64) < end - offset {
                // Final segment shorter than the length claimed.
                let result: Result<Vec<u8>, StreamError> =
                    Err(StreamError::TruncatedStream { segment_index: index + 1 });
                return self.guard(result);
            }
            index += 1;
        }

        // A range reaching the end is only complete once a segment flagged
        // final has opened. With eager sealing that is an empty segment after
        // a full one.
        if end == total && self.state != ReaderState::Exhausted {
            match self.read_segment()? {
                Some(pt) if pt.is_empty() && self.state == ReaderState::Exhausted => {}
                _ => {
                    let result: Result<Vec<u8>, StreamError> =
                        Err(StreamError::TruncatedStream { segment_index: index });
                    return self.guard(result);
                }
            }
        }
        Ok(out)
    }

    fn ensure_header_at_start(&mut self) -> Result<(), StreamError> {
        if self.session.is_some() {
            return Ok(());
        }
        let result = self.source.seek(SeekFrom::Start(0)).map_err(StreamError::from);
        self.guard(result)?;
        self.ensure_header()
    }

    /// Total source length; leaves the cursor where the next segment starts.
    fn source_len(&mut self) -> Result<u64, StreamError> {
        let total = self.source.seek(SeekFrom::End(0))?;
        self.source.seek(SeekFrom::Start(self.layout.segment_offset(self.next_index)))?;
        self.lookahead = None;
        Ok(total)
    }
}
