//! compression/buffering.rs
//! Buffering compressor: collect everything, compress once on finalize.
//!
//! Summary: `submit` only copies into an owned buffer and returns nothing.
//! `finalize` runs the full-buffer primitive (twice under
//! `BlockSplitting::Auto`) and returns the complete container stream.

use std::sync::Mutex;

use tracing::debug;

use crate::backend::{DeflateBackend, StandardBackend};
use crate::compression::constants::messages;
use crate::compression::types::{BlockSplitting, CompressionOptions, StreamCompressor};
use crate::telemetry::{CompressionCounters, Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::CompressError;

#[derive(Debug, Default)]
struct BufferingState {
    buffer: Vec<u8>,
    finalized: bool,
    counters: CompressionCounters,
    timer: TelemetryTimer,
}

/// Accumulates all input and compresses it in a single pass.
#[derive(Debug)]
pub struct BufferingCompressor<B = StandardBackend> {
    options: CompressionOptions,
    backend: B,
    state: Mutex<BufferingState>,
}

impl BufferingCompressor<StandardBackend> {
    pub fn new(options: CompressionOptions) -> Self {
        Self::with_backend(options, StandardBackend::new())
    }

    /// Construct from binding-level integers; fails on an unknown format.
    pub fn from_raw(
        format: i32,
        verbose: bool,
        iterations: i32,
        block_splitting: i32,
        block_splitting_max: i32,
    ) -> Result<Self, CompressError> {
        let options = CompressionOptions::from_raw(
            format,
            verbose,
            iterations,
            block_splitting,
            block_splitting_max,
        )?;
        Ok(Self::new(options))
    }
}

impl<B: DeflateBackend> BufferingCompressor<B> {
    pub fn with_backend(options: CompressionOptions, backend: B) -> Self {
        Self {
            options,
            backend,
            state: Mutex::new(BufferingState::default()),
        }
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    pub fn is_finalized(&self) -> bool {
        self.state.lock().map(|s| s.finalized).unwrap_or(true)
    }

    /// Append `chunk` to the buffer. Always returns an empty vector.
    pub fn submit(&self, chunk: &[u8]) -> Result<Vec<u8>, CompressError> {
        let mut guard = self.state.lock()?;
        let state = &mut *guard;
        if state.finalized {
            return Err(CompressError::InvalidState(messages::COMPRESSOR_FLUSHED));
        }

        let buffer = &mut state.buffer;
        state.timer.time(Stage::Buffer, || -> Result<(), CompressError> {
            buffer.try_reserve(chunk.len())?;
            buffer.extend_from_slice(chunk);
            Ok(())
        })?;
        state.counters.add_submit(chunk.len(), 0);

        debug!(chunk = chunk.len(), buffered = state.buffer.len(), "buffering submit");
        Ok(Vec::new())
    }

    /// Compress the buffered input. The object is unusable afterwards,
    /// whether or not compression succeeded.
    pub fn finalize(&self) -> Result<Vec<u8>, CompressError> {
        let mut state = self.state.lock()?;
        if state.finalized {
            return Err(CompressError::InvalidState(messages::REPEATED_FLUSH));
        }

        let result = self.compress_buffer(&mut state);
        state.finalized = true;
        state.buffer = Vec::new();
        state.timer.finish();

        let out = result?;
        state.counters.add_finalize(out.len());
        debug!(
            format = %self.options.format,
            input = state.counters.bytes_in,
            output = out.len(),
            "buffering finalize"
        );
        Ok(out)
    }

    fn compress_buffer(&self, state: &mut BufferingState) -> Result<Vec<u8>, CompressError> {
        let format = self.options.format;
        let buffer = &state.buffer;
        let counters = &mut state.counters;

        state.timer.time(Stage::Compress, || -> Result<Vec<u8>, CompressError> {
            if self.options.block_splitting != BlockSplitting::Auto {
                counters.add_backend_call();
                return Ok(self
                    .backend
                    .compress_full(&self.options.backend_options(false), format, buffer)?);
            }

            counters.add_backend_call();
            let first = self
                .backend
                .compress_full(&self.options.backend_options(false), format, buffer)?;

            counters.add_backend_call();
            let second = self
                .backend
                .compress_full(&self.options.backend_options(true), format, buffer)?;

            debug!(first = first.len(), second = second.len(), "auto block splitting");
            Ok(if first.len() < second.len() { first } else { second })
        })
    }

    pub fn telemetry(&self) -> Result<TelemetrySnapshot, CompressError> {
        let state = self.state.lock()?;
        Ok(TelemetrySnapshot::from(&state.counters, &state.timer, state.finalized))
    }
}

impl<B: DeflateBackend> StreamCompressor for BufferingCompressor<B> {
    fn submit(&self, chunk: &[u8]) -> Result<Vec<u8>, CompressError> {
        BufferingCompressor::submit(self, chunk)
    }

    fn finalize(&self) -> Result<Vec<u8>, CompressError> {
        BufferingCompressor::finalize(self)
    }
}
