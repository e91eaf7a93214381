//! deflate-stream-core
//!
//! Pure Rust incremental DEFLATE stream compression.
//! No Python, no PyO3, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod backend;
pub mod compression;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::backend::{BackendOptions, BlockType, DeflateBackend, PartialOutput, StandardBackend};
    pub use crate::compression::{
        compress_stream, compress_to_vec, BlockSplitting, BufferingCompressor, CompressionOptions,
        Format, IncrementalEncoder, StreamCompressor,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::CompressError;
}
