//! backend/mod.rs
//! The DEFLATE primitive behind both stream objects.
//!
//! Summary: `DeflateBackend` is the seam; `StandardBackend` is the
//! built-in implementation (LZ77 + Huffman + block splitting + framing).

mod bitwriter;
mod block;
mod constants;
mod container;
mod huffman;
mod lz77;
mod split;

pub mod standard;
pub mod types;

pub use standard::StandardBackend;
pub use types::{BackendError, BackendOptions, BlockType, DeflateBackend, PartialOutput};
