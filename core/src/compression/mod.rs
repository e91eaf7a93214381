//! compression/mod.rs
//! Stream compressors over the DEFLATE primitive.
//!
//! Summary:
//! - `BufferingCompressor` buffers everything and compresses once (gzip, zlib or raw).
//! - `IncrementalEncoder` emits raw DEFLATE as chunks arrive.
//! - Both implement `StreamCompressor`, which the stream helpers accept.

pub mod constants;
pub mod types;
pub mod buffering;
pub mod incremental;
pub mod stream;

pub use constants::*;
pub use types::*;
pub use buffering::BufferingCompressor;
pub use incremental::IncrementalEncoder;
pub use stream::{compress_stream, compress_to_vec};
