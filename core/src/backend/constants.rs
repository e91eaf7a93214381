//! backend/constants.rs
//! DEFLATE format constants (RFC 1951).

pub(crate) const WINDOW_SIZE: usize = 32 * 1024;
pub(crate) const MIN_MATCH: usize = 3;
pub(crate) const MAX_MATCH: usize = 258;

/// Largest payload of a single stored block.
pub(crate) const MAX_STORED_BLOCK: usize = 65_535;

pub(crate) const END_OF_BLOCK: usize = 256;
pub(crate) const NUM_LIT_CODES: usize = 286;
pub(crate) const NUM_DIST_CODES: usize = 30;
pub(crate) const NUM_CL_CODES: usize = 19;

pub(crate) const BTYPE_STORED: u32 = 0;
pub(crate) const BTYPE_FIXED: u32 = 1;
pub(crate) const BTYPE_DYNAMIC: u32 = 2;

pub(crate) const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

pub(crate) const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub(crate) const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub(crate) const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of code length code lengths.
pub(crate) const CL_ORDER: [usize; NUM_CL_CODES] =
    [16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];
