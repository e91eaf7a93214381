//! telemetry/counters.rs
//! Mutable counters collected while a stream is being compressed.
//!
//! Summary: Chunk and byte counts plus primitive invocations. Converted
//! into an immutable TelemetrySnapshot on request.
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionCounters {
    pub chunks_submitted: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub backend_calls: u64,
}

impl CompressionCounters {
    /// Record one submitted chunk and the bytes returned for it.
    pub fn add_submit(&mut self, chunk_len: usize, returned_len: usize) {
        self.chunks_submitted += 1;
        self.bytes_in += chunk_len as u64;
        self.bytes_out += returned_len as u64;
    }

    /// Record bytes returned by finalize.
    pub fn add_finalize(&mut self, returned_len: usize) {
        self.bytes_out += returned_len as u64;
    }

    pub fn add_backend_call(&mut self) {
        self.backend_calls += 1;
    }

    pub fn merge(&mut self, other: &CompressionCounters) {
        self.chunks_submitted += other.chunks_submitted;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.backend_calls += other.backend_calls;
    }
}

impl AddAssign for CompressionCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
