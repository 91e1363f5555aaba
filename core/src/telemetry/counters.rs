//! telemetry/counters.rs
//! Mutable counters kept by each writer/reader instance.
//!
//! Summary: Segment counts and byte counts. Converted into an immutable
//! `TelemetrySnapshot` on request.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub headers: u64,
    pub segments: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    /// Header bytes plus tag bytes.
    pub bytes_overhead: u64,
}

impl TelemetryCounters {
    /// Record the stream header as overhead.
    pub fn add_header(&mut self, header_len: usize) {
        self.headers += 1;
        self.bytes_ciphertext += header_len as u64;
        self.bytes_overhead += header_len as u64;
    }

    /// Record one sealed or opened segment.
    ///
    /// - `pt_len`: plaintext bytes of the segment
    /// - `tag_len`: tag bytes appended to it
    pub fn add_segment(&mut self, pt_len: usize, tag_len: usize) {
        self.segments += 1;
        self.bytes_plaintext += pt_len as u64;
        self.bytes_ciphertext += (pt_len + tag_len) as u64;
        self.bytes_overhead += tag_len as u64;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        *self += other.clone();
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.headers          += rhs.headers;
        self.segments         += rhs.segments;
        self.bytes_plaintext  += rhs.bytes_plaintext;
        self.bytes_ciphertext += rhs.bytes_ciphertext;
        self.bytes_overhead   += rhs.bytes_overhead;
    }
}
