//! compression/constants.rs
//! Stable format and policy identifiers, plus option defaults.

/// Container format IDs (i32, as exposed to bindings).
pub mod format_ids {
    pub const GZIP: i32 = 0;
    pub const ZLIB: i32 = 1;
    pub const DEFLATE: i32 = 2;
}

/// Block splitting policy IDs.
pub mod block_splitting_ids {
    pub const DISABLED: i32 = 0;
    pub const ENABLED: i32 = 1;
    pub const ENABLED_LAST: i32 = 2;
    pub const AUTO: i32 = 3;
}

pub const DEFAULT_ITERATIONS: u32 = 15;
pub const DEFAULT_BLOCK_SPLITTING_MAX: u32 = 15;

/// Messages of the state errors.
pub mod messages {
    pub const COMPRESSOR_FLUSHED: &str = "Compressor has been flushed";
    pub const DEFLATER_FLUSHED: &str = "Deflater has been flushed";
    pub const REPEATED_FLUSH: &str = "repeated call to flush()";
}
