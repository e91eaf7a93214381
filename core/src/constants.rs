//! constants.rs
//! Crate-wide sizes.

/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// `compress_full` encodes its input in master blocks of this many bytes.
/// Matches may reach back across master blocks.
pub const MASTER_BLOCK_SIZE: usize = 1_000_000;
