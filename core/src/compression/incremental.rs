//! compression/incremental.rs
//! Incremental encoder: one raw DEFLATE stream spliced from per-chunk blocks.
//!
//! Summary: Every `submit` compresses the chunk held from the previous call
//! as non-final blocks and holds the new one. `finalize` compresses the
//! held chunk (or nothing) as the final block. Each call returns the bytes
//! of the persistent output that became known since the previous call.

use std::ops::Range;
use std::sync::Mutex;

use tracing::debug;

use crate::backend::{BackendOptions, BlockType, DeflateBackend, PartialOutput, StandardBackend};
use crate::compression::constants::messages;
use crate::compression::types::{BlockSplitting, CompressionOptions, Format, StreamCompressor};
use crate::telemetry::{CompressionCounters, Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::CompressError;

#[derive(Debug, Default)]
struct EncoderState {
    out: PartialOutput,
    /// At most one chunk waits for compression.
    pending: Option<Vec<u8>>,
    finalized: bool,
    counters: CompressionCounters,
    timer: TelemetryTimer,
}

/// Streams raw DEFLATE, one chunk behind the caller.
#[derive(Debug)]
pub struct IncrementalEncoder<B = StandardBackend> {
    options: CompressionOptions,
    backend_options: BackendOptions,
    backend: B,
    state: Mutex<EncoderState>,
}

impl IncrementalEncoder<StandardBackend> {
    /// `block_splitting`: 0 disables splitting, 2 chooses split points after
    /// matching for every block, anything else enables plain splitting.
    pub fn new(verbose: bool, iterations: i32, block_splitting: i32, block_splitting_max: i32) -> Self {
        let options = CompressionOptions::new()
            .with_verbose(verbose)
            .with_iterations(iterations)
            .with_block_splitting(BlockSplitting::normalize(block_splitting))
            .with_block_splitting_max(block_splitting_max);
        Self::from_options(options)
    }

    pub fn from_options(options: CompressionOptions) -> Self {
        Self::with_backend(options, StandardBackend::new())
    }
}

impl<B: DeflateBackend> IncrementalEncoder<B> {
    /// The format is always raw DEFLATE; `options.format` is ignored.
    /// `BlockSplitting::Auto` has no incremental form and becomes `Enabled`.
    pub fn with_backend(options: CompressionOptions, backend: B) -> Self {
        let options = options
            .with_format(Format::Deflate)
            .with_block_splitting(incremental_splitting(options.block_splitting));
        let last = options.block_splitting == BlockSplitting::EnabledLast;
        Self {
            backend_options: options.backend_options(last),
            options,
            backend,
            state: Mutex::new(EncoderState::default()),
        }
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    pub fn is_finalized(&self) -> bool {
        self.state.lock().map(|s| s.finalized).unwrap_or(true)
    }

    /// Compress the held chunk as non-final blocks, then hold `chunk`.
    pub fn submit(&self, chunk: &[u8]) -> Result<Vec<u8>, CompressError> {
        let mut guard = self.state.lock()?;
        let state = &mut *guard;
        if state.finalized {
            return Err(CompressError::InvalidState(messages::DEFLATER_FLUSHED));
        }

        let held = state.timer.time(Stage::Buffer, || -> Result<Vec<u8>, CompressError> {
            let mut held = Vec::new();
            held.try_reserve_exact(chunk.len())?;
            held.extend_from_slice(chunk);
            Ok(held)
        })?;

        let emitted = self.compress_pending(state, false)?;
        state.pending = Some(held);
        state.counters.add_submit(chunk.len(), emitted.len());

        debug!(
            chunk = chunk.len(),
            emitted = emitted.len(),
            bit_pos = state.out.bit_pos(),
            "incremental submit"
        );
        Ok(emitted)
    }

    /// Compress the held chunk as the final block. The object is unusable
    /// afterwards, whether or not compression succeeded.
    pub fn finalize(&self) -> Result<Vec<u8>, CompressError> {
        let mut guard = self.state.lock()?;
        let state = &mut *guard;
        if state.finalized {
            return Err(CompressError::InvalidState(messages::REPEATED_FLUSH));
        }
        state.finalized = true;

        let result = self.compress_pending(state, true);
        state.pending = None;
        state.out = PartialOutput::new();
        state.timer.finish();

        let emitted = result?;
        state.counters.add_finalize(emitted.len());
        debug!(emitted = emitted.len(), "incremental finalize");
        Ok(emitted)
    }

    fn compress_pending(&self, state: &mut EncoderState, final_block: bool) -> Result<Vec<u8>, CompressError> {
        let before = state.out.len();
        let input: &[u8] = state.pending.as_deref().unwrap_or(&[]);

        let out = &mut state.out;
        let result = state.timer.time(Stage::Compress, || {
            self.backend.compress_part(
                &self.backend_options,
                BlockType::Dynamic,
                final_block,
                input,
                out,
            )
        });
        state.counters.add_backend_call();
        result?;

        let out = &state.out;
        state.timer.time(Stage::Splice, || -> Result<Vec<u8>, CompressError> {
            let range = emitted_range(before, out.len(), final_block);
            let mut emitted = Vec::new();
            emitted.try_reserve_exact(range.len())?;
            emitted.extend_from_slice(&out.as_bytes()[range]);
            Ok(emitted)
        })
    }

    pub fn telemetry(&self) -> Result<TelemetrySnapshot, CompressError> {
        let state = self.state.lock()?;
        Ok(TelemetrySnapshot::from(&state.counters, &state.timer, state.finalized))
    }
}

fn incremental_splitting(policy: BlockSplitting) -> BlockSplitting {
    match policy {
        BlockSplitting::Auto => BlockSplitting::Enabled,
        other => other,
    }
}

/// Bytes of the persistent output to hand out after a call that grew it
/// from `before` to `after` bytes.
///
/// The byte at `before - 1` is handed out again because the new blocks may
/// have filled its open bits. A non-final call withholds its own last byte
/// for the same reason.
pub(crate) fn emitted_range(before: usize, after: usize, final_block: bool) -> Range<usize> {
    let start = before.saturating_sub(1);
    let end = if final_block {
        after
    } else {
        after.saturating_sub(1)
    };
    start..end.max(start)
}

impl<B: DeflateBackend> StreamCompressor for IncrementalEncoder<B> {
    fn submit(&self, chunk: &[u8]) -> Result<Vec<u8>, CompressError> {
        IncrementalEncoder::submit(self, chunk)
    }

    fn finalize(&self) -> Result<Vec<u8>, CompressError> {
        IncrementalEncoder::finalize(self)
    }
}
