//! backend/types.rs
//! The DEFLATE primitive seam: options, block types, errors and the
//! coupled output/cursor state.

use thiserror::Error;

use crate::backend::bitwriter::BitWriter;
use crate::compression::types::Format;

/// Encoding requested for a block.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Uncompressed.
    Stored = 0,
    /// Fixed Huffman codes.
    Fixed = 1,
    /// Huffman coded, cheapest of stored, fixed and dynamic per block.
    Dynamic = 2,
}

/// Native option record of the primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendOptions {
    pub verbose: bool,
    /// Search effort, at least 1.
    pub iterations: u32,
    pub block_splitting: bool,
    /// Choose split points after matching instead of before.
    pub block_splitting_last: bool,
    /// Maximum number of blocks per range, 0 for no limit.
    pub block_splitting_max: u32,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            iterations: 15,
            block_splitting: true,
            block_splitting_last: false,
            block_splitting_max: 15,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend resource error: {0}")]
    Resource(String),

    #[error("invalid bit cursor {bit_pos} for output of {len} bytes")]
    InvalidCursor { bit_pos: u8, len: usize },
}

/// A DEFLATE compression primitive.
pub trait DeflateBackend: Send + Sync {
    /// Compress `input` in one pass and apply the container framing of `format`.
    fn compress_full(
        &self,
        opts: &BackendOptions,
        format: Format,
        input: &[u8],
    ) -> Result<Vec<u8>, BackendError>;

    /// Append the blocks for `input` to `out`, continuing at its bit cursor.
    ///
    /// Only the last block carries the final flag, and only when `final_block`
    /// is set. On error `out` is left unchanged.
    fn compress_part(
        &self,
        opts: &BackendOptions,
        block_type: BlockType,
        final_block: bool,
        input: &[u8],
        out: &mut PartialOutput,
    ) -> Result<(), BackendError>;
}

/// Raw DEFLATE output together with its sub-byte cursor.
///
/// `bit_pos` counts the valid low bits of the last byte; 0 means the last
/// byte is complete. The two only change together.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PartialOutput {
    bytes: Vec<u8>,
    bit_pos: u8,
}

impl PartialOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(bytes: Vec<u8>, bit_pos: u8) -> Result<Self, BackendError> {
        check_cursor(bytes.len(), bit_pos)?;
        Ok(Self { bytes, bit_pos })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Replace the open tail byte (if any) with `tail` and move the cursor.
    ///
    /// `tail` must start with the open byte's bits when `bit_pos() != 0`.
    /// Space is reserved before anything changes, so an error leaves the
    /// output as it was.
    pub fn splice(&mut self, tail: &[u8], bit_pos: u8) -> Result<(), BackendError> {
        let keep = if self.bit_pos != 0 {
            self.bytes.len() - 1
        } else {
            self.bytes.len()
        };
        check_cursor(keep + tail.len(), bit_pos)?;

        let grow = (keep + tail.len()).saturating_sub(self.bytes.len());
        self.bytes
            .try_reserve(grow)
            .map_err(|e| BackendError::Resource(e.to_string()))?;

        self.bytes.truncate(keep);
        self.bytes.extend_from_slice(tail);
        self.bit_pos = bit_pos;
        Ok(())
    }

    /// A bit writer positioned at the cursor.
    pub(crate) fn resume(&self) -> Result<BitWriter, BackendError> {
        check_cursor(self.bytes.len(), self.bit_pos)?;
        match (self.bit_pos, self.bytes.last()) {
            (0, _) | (_, None) => Ok(BitWriter::new()),
            (bits, Some(&tail)) => Ok(BitWriter::resume(tail, bits)),
        }
    }

    /// Splice everything a resumed writer produced.
    pub(crate) fn commit(&mut self, writer: BitWriter) -> Result<(), BackendError> {
        let (tail, bit_pos) = writer.finish();
        self.splice(&tail, bit_pos)
    }
}

fn check_cursor(len: usize, bit_pos: u8) -> Result<(), BackendError> {
    if bit_pos > 7 || (bit_pos != 0 && len == 0) {
        return Err(BackendError::InvalidCursor { bit_pos, len });
    }
    Ok(())
}
