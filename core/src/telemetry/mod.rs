//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for the stream objects.
//!
//! Summary: Each stream object owns one `CompressionCounters` and one
//! `TelemetryTimer`, updated under its instance lock. `telemetry()` turns
//! them into a `TelemetrySnapshot`.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
