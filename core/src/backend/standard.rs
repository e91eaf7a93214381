//! backend/standard.rs
//! Built-in DEFLATE primitive.
//!
//! Summary: Hash-chain LZ77, exact-cost block type selection and
//! cost-driven block splitting. Not an optimal parser; `iterations` only
//! deepens the match search.

use tracing::{debug, info, trace};

use crate::backend::bitwriter::BitWriter;
use crate::backend::block::write_block;
use crate::backend::container;
use crate::backend::lz77::{tokenize, LzParams, Token};
use crate::backend::split::find_split_points;
use crate::backend::types::{BackendError, BackendOptions, BlockType, DeflateBackend, PartialOutput};
use crate::compression::types::Format;
use crate::constants::MASTER_BLOCK_SIZE;

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardBackend;

impl StandardBackend {
    pub fn new() -> Self {
        Self
    }

    /// Write `data[start..end]` as one or more blocks. Bytes before `start`
    /// serve as the match window. Returns the number of blocks written.
    #[allow(clippy::too_many_arguments)]
    fn deflate_range(
        &self,
        opts: &BackendOptions,
        block_type: BlockType,
        final_block: bool,
        data: &[u8],
        start: usize,
        end: usize,
        writer: &mut BitWriter,
    ) -> usize {
        if start == end {
            if !final_block {
                return 0;
            }
            write_block(writer, &[], &[], true, block_type);
            return 1;
        }
        if block_type == BlockType::Stored {
            write_block(writer, &data[start..end], &[], final_block, block_type);
            return 1;
        }

        let params = LzParams::from_iterations(opts.iterations);
        let max_blocks = opts.block_splitting_max as usize;

        if !opts.block_splitting {
            let tokens = tokenize(data, start, end, params);
            write_block(writer, &data[start..end], &tokens, final_block, block_type);
            return 1;
        }

        if opts.block_splitting_last {
            let tokens = tokenize(data, start, end, params);
            let splits = find_split_points(&tokens, max_blocks);
            let bounds = token_bounds(&splits, tokens.len());

            let mut pos = start;
            for (i, pair) in bounds.windows(2).enumerate() {
                let segment = &tokens[pair[0]..pair[1]];
                let span: usize = segment.iter().map(Token::span).sum();
                let last = i + 2 == bounds.len();
                write_block(writer, &data[pos..pos + span], segment, final_block && last, block_type);
                pos += span;
            }
            return bounds.len() - 1;
        }

        let estimate = tokenize(data, start, end, LzParams::quick());
        let splits = find_split_points(&estimate, max_blocks);
        let mut edges = Vec::with_capacity(splits.len() + 2);
        edges.push(start);
        edges.extend(byte_offsets(&estimate, &splits).into_iter().map(|o| start + o));
        edges.push(end);

        for (i, pair) in edges.windows(2).enumerate() {
            let last = i + 2 == edges.len();
            let tokens = tokenize(data, pair[0], pair[1], params);
            write_block(writer, &data[pair[0]..pair[1]], &tokens, final_block && last, block_type);
        }
        edges.len() - 1
    }
}

/// Token index boundaries: 0, each split, then `len`.
fn token_bounds(splits: &[usize], len: usize) -> Vec<usize> {
    let mut bounds = Vec::with_capacity(splits.len() + 2);
    bounds.push(0);
    bounds.extend_from_slice(splits);
    bounds.push(len);
    bounds
}

/// Byte offset of each token split point, relative to the first token.
fn byte_offsets(tokens: &[Token], splits: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(splits.len());
    let mut offset = 0;
    let mut next = splits.iter().peekable();
    for (i, token) in tokens.iter().enumerate() {
        while next.peek().is_some_and(|&&s| s == i) {
            offsets.push(offset);
            next.next();
        }
        offset += token.span();
    }
    offsets
}

fn report(opts: &BackendOptions, what: &str, input: usize, output: usize, blocks: usize) {
    if opts.verbose {
        let removed = if input == 0 {
            0.0
        } else {
            100.0 * (input as f64 - output as f64) / input as f64
        };
        info!(input, output, blocks, removed = format_args!("{removed:.2}%"), "{what}");
    } else {
        debug!(input, output, blocks, "{what}");
    }
}

impl DeflateBackend for StandardBackend {
    fn compress_full(
        &self,
        opts: &BackendOptions,
        format: Format,
        input: &[u8],
    ) -> Result<Vec<u8>, BackendError> {
        let mut writer = BitWriter::new();
        let mut blocks = 0;

        if input.is_empty() {
            blocks += self.deflate_range(opts, BlockType::Dynamic, true, input, 0, 0, &mut writer);
        }
        let mut start = 0;
        while start < input.len() {
            let end = (start + MASTER_BLOCK_SIZE).min(input.len());
            blocks += self.deflate_range(
                opts,
                BlockType::Dynamic,
                end == input.len(),
                input,
                start,
                end,
                &mut writer,
            );
            start = end;
        }

        let (body, _) = writer.finish();
        let out = container::wrap(format, input, body)?;
        report(opts, "compress_full", input.len(), out.len(), blocks);
        Ok(out)
    }

    fn compress_part(
        &self,
        opts: &BackendOptions,
        block_type: BlockType,
        final_block: bool,
        input: &[u8],
        out: &mut PartialOutput,
    ) -> Result<(), BackendError> {
        let mut writer = out.resume()?;
        let blocks = self.deflate_range(
            opts,
            block_type,
            final_block,
            input,
            0,
            input.len(),
            &mut writer,
        );
        if blocks == 0 {
            return Ok(());
        }
        trace!(bits = writer.bits_written(), from = out.bit_pos(), final_block, "part encoded");

        let before = out.len();
        out.commit(writer)?;
        report(opts, "compress_part", input.len(), out.len().saturating_sub(before), blocks);
        Ok(())
    }
}
