//! telemetry/snapshot.rs
//! Immutable telemetry snapshot.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::telemetry::counters::CompressionCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

/// Counters, ratio, stage timings and elapsed time at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub chunks_submitted: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub backend_calls: u64,
    pub finalized: bool,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &CompressionCounters, timer: &TelemetryTimer, finalized: bool) -> Self {
        Self {
            chunks_submitted: counters.chunks_submitted,
            bytes_in: counters.bytes_in,
            bytes_out: counters.bytes_out,
            backend_calls: counters.backend_calls,
            finalized,
            elapsed: timer.elapsed(),
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Output bytes per input byte; 0.0 before any input.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
