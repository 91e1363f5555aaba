//! telemetry/snapshot.rs
//! Immutable telemetry snapshot, serde-serializable for the outer layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub segments: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    pub bytes_overhead: u64,
    /// Ciphertext bytes per plaintext byte (0.0 before any plaintext).
    pub expansion_ratio: f64,
    pub throughput_plaintext_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let expansion_ratio = if counters.bytes_plaintext > 0 {
            counters.bytes_ciphertext as f64 / counters.bytes_plaintext as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_plaintext as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            segments: counters.segments,
            bytes_plaintext: counters.bytes_plaintext,
            bytes_ciphertext: counters.bytes_ciphertext,
            bytes_overhead: counters.bytes_overhead,
            expansion_ratio,
            throughput_plaintext_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Consistency: ciphertext = plaintext + overhead; stage time fits in elapsed.
    pub fn sanity_check(&self) -> bool {
        self.bytes_ciphertext == self.bytes_plaintext + self.bytes_overhead
            && self.stage_times.total() <= self.elapsed
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
