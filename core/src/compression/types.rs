//! compression/types.rs
//! Option model shared by both stream objects.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backend::BackendOptions;
use crate::compression::constants::{
    block_splitting_ids, format_ids, DEFAULT_BLOCK_SPLITTING_MAX, DEFAULT_ITERATIONS,
};
use crate::types::CompressError;

/// Container framing of the compressed stream.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Gzip = format_ids::GZIP,
    Zlib = format_ids::ZLIB,
    Deflate = format_ids::DEFLATE,
}

impl Format {
    /// Validate a raw format ID.
    pub fn from_raw(raw: i32) -> Result<Self, CompressError> {
        Self::try_from_primitive(raw)
            .map_err(|_| CompressError::InvalidArgument(format!("unknown format: {raw}")))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Gzip => "gzip",
            Format::Zlib => "zlib",
            Format::Deflate => "deflate",
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Deflate
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Block splitting policy.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSplitting {
    Disabled = block_splitting_ids::DISABLED,
    Enabled = block_splitting_ids::ENABLED,
    /// Split points chosen after matching (incremental encoder: every block).
    EnabledLast = block_splitting_ids::ENABLED_LAST,
    /// Compress both ways and keep the smaller result (buffering only).
    Auto = block_splitting_ids::AUTO,
}

impl Default for BlockSplitting {
    fn default() -> Self {
        BlockSplitting::Enabled
    }
}

impl BlockSplitting {
    /// Out-of-range values fall back to `Enabled`.
    pub fn normalize(raw: i32) -> Self {
        Self::try_from_primitive(raw).unwrap_or(Self::Enabled)
    }
}

/// Options fixed at construction of a stream object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    pub format: Format,
    pub verbose: bool,
    /// Search effort, at least 1.
    pub iterations: u32,
    pub block_splitting: BlockSplitting,
    /// Maximum number of blocks, 0 for no limit.
    pub block_splitting_max: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            format: Format::Deflate,
            verbose: false,
            iterations: DEFAULT_ITERATIONS,
            block_splitting: BlockSplitting::Enabled,
            block_splitting_max: DEFAULT_BLOCK_SPLITTING_MAX,
        }
    }
}

impl CompressionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from binding-level integers.
    ///
    /// Fails only on an unknown `format`; every other value is normalized.
    pub fn from_raw(
        format: i32,
        verbose: bool,
        iterations: i32,
        block_splitting: i32,
        block_splitting_max: i32,
    ) -> Result<Self, CompressError> {
        Ok(Self::new()
            .with_format(Format::from_raw(format)?)
            .with_verbose(verbose)
            .with_iterations(iterations)
            .with_block_splitting(BlockSplitting::normalize(block_splitting))
            .with_block_splitting_max(block_splitting_max))
    }

    pub fn from_json(json: &str) -> Result<Self, CompressError> {
        let mut opts: Self = serde_json::from_str(json)
            .map_err(|e| CompressError::InvalidArgument(format!("options: {e}")))?;
        opts.iterations = opts.iterations.max(1);
        Ok(opts)
    }

    pub fn to_json(&self) -> Result<String, CompressError> {
        serde_json::to_string(self).map_err(|e| CompressError::InvalidArgument(e.to_string()))
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Values below 1 become 1.
    pub fn with_iterations(mut self, iterations: i32) -> Self {
        self.iterations = iterations.max(1) as u32;
        self
    }

    pub fn with_block_splitting(mut self, block_splitting: BlockSplitting) -> Self {
        self.block_splitting = block_splitting;
        self
    }

    /// Values of 0 or below mean no limit.
    pub fn with_block_splitting_max(mut self, block_splitting_max: i32) -> Self {
        self.block_splitting_max = block_splitting_max.max(0) as u32;
        self
    }

    /// Primitive options, with split points chosen after matching if `last`.
    pub(crate) fn backend_options(&self, last: bool) -> BackendOptions {
        BackendOptions {
            verbose: self.verbose,
            iterations: self.iterations.max(1),
            block_splitting: self.block_splitting != BlockSplitting::Disabled,
            block_splitting_last: last,
            block_splitting_max: self.block_splitting_max,
        }
    }
}

/// The submit/finalize protocol shared by both stream objects.
pub trait StreamCompressor: Send + Sync {
    /// Feed a chunk, returning whatever compressed bytes became available.
    fn submit(&self, chunk: &[u8]) -> Result<Vec<u8>, CompressError>;

    /// Finish the stream, returning the remaining compressed bytes.
    fn finalize(&self) -> Result<Vec<u8>, CompressError>;
}
