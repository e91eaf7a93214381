//! backend/block.rs
//! Block encoding: stored, fixed Huffman and dynamic Huffman blocks.
//!
//! Summary: Costs are exact bit counts for the block as it would be
//! written at the current cursor, so the cheapest encoding can be picked
//! before any bit is emitted.

use tracing::debug;

use crate::backend::bitwriter::BitWriter;
use crate::backend::constants::{
    BTYPE_DYNAMIC, BTYPE_FIXED, BTYPE_STORED, CL_ORDER, DISTANCE_BASE, DISTANCE_EXTRA,
    END_OF_BLOCK, LENGTH_BASE, LENGTH_EXTRA, MAX_STORED_BLOCK, NUM_CL_CODES, NUM_DIST_CODES,
    NUM_LIT_CODES,
};
use crate::backend::huffman::{
    code_lengths, ensure_two_codes, HuffmanCode, FIXED_DIST_LENGTHS, FIXED_LIT_LENGTHS,
    MAX_CL_BITS, MAX_CODE_BITS,
};
use crate::backend::lz77::Token;
use crate::backend::types::BlockType;

/// Symbol counts of one block, end-of-block included.
#[derive(Debug, Clone)]
pub(crate) struct Histogram {
    pub lit: [u32; NUM_LIT_CODES],
    pub dist: [u32; NUM_DIST_CODES],
}

impl Histogram {
    pub(crate) fn from_tokens(tokens: &[Token]) -> Self {
        let mut hist = Self {
            lit: [0; NUM_LIT_CODES],
            dist: [0; NUM_DIST_CODES],
        };
        for token in tokens {
            match *token {
                Token::Literal(b) => hist.lit[usize::from(b)] += 1,
                Token::Match { length, distance } => {
                    hist.lit[257 + length_index(length)] += 1;
                    hist.dist[distance_index(distance)] += 1;
                }
            }
        }
        hist.lit[END_OF_BLOCK] += 1;
        hist
    }

    /// Bits for the symbols and extra bits under the given code lengths.
    fn data_bits(&self, lit_lengths: &[u8], dist_lengths: &[u8]) -> u64 {
        let lit: u64 = self
            .lit
            .iter()
            .zip(lit_lengths)
            .map(|(&f, &len)| u64::from(f) * u64::from(len))
            .sum();
        let dist: u64 = self
            .dist
            .iter()
            .zip(dist_lengths)
            .map(|(&f, &len)| u64::from(f) * u64::from(len))
            .sum();
        let length_extra: u64 = self.lit[257..]
            .iter()
            .zip(LENGTH_EXTRA.iter())
            .map(|(&f, &e)| u64::from(f) * u64::from(e))
            .sum();
        let dist_extra: u64 = self
            .dist
            .iter()
            .zip(DISTANCE_EXTRA.iter())
            .map(|(&f, &e)| u64::from(f) * u64::from(e))
            .sum();
        lit + dist + length_extra + dist_extra
    }
}

#[inline]
pub(crate) fn length_index(length: u16) -> usize {
    LENGTH_BASE.partition_point(|&base| base <= length) - 1
}

#[inline]
pub(crate) fn distance_index(distance: u16) -> usize {
    DISTANCE_BASE.partition_point(|&base| base <= distance) - 1
}

/// Code lengths and header layout of a dynamic block.
#[derive(Debug)]
struct DynamicPlan {
    lit_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    cl_lengths: Vec<u8>,
    rle: Vec<(u8, u8)>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
}

impl DynamicPlan {
    fn new(hist: &Histogram) -> Self {
        let mut lit_lengths = code_lengths(&hist.lit, MAX_CODE_BITS);
        ensure_two_codes(&mut lit_lengths);
        let mut dist_lengths = code_lengths(&hist.dist, MAX_CODE_BITS);
        ensure_two_codes(&mut dist_lengths);

        let hlit = last_used(&lit_lengths).max(257);
        let hdist = last_used(&dist_lengths).max(1);

        let mut joined = Vec::with_capacity(hlit + hdist);
        joined.extend_from_slice(&lit_lengths[..hlit]);
        joined.extend_from_slice(&dist_lengths[..hdist]);
        let rle = run_length_encode(&joined);

        let mut cl_freqs = [0u32; NUM_CL_CODES];
        for &(symbol, _) in &rle {
            cl_freqs[usize::from(symbol)] += 1;
        }
        let mut cl_lengths = code_lengths(&cl_freqs, MAX_CL_BITS);
        ensure_two_codes(&mut cl_lengths);

        let hclen = CL_ORDER
            .iter()
            .rposition(|&sym| cl_lengths[sym] != 0)
            .map_or(4, |i| (i + 1).max(4));

        Self {
            lit_lengths,
            dist_lengths,
            cl_lengths,
            rle,
            hlit,
            hdist,
            hclen,
        }
    }

    /// Header size after the three block-type bits.
    fn header_bits(&self) -> u64 {
        let trees: u64 = self
            .rle
            .iter()
            .map(|&(symbol, _)| u64::from(self.cl_lengths[usize::from(symbol)]) + rle_extra_bits(symbol))
            .sum();
        14 + 3 * self.hclen as u64 + trees
    }

    fn cost(&self, hist: &Histogram) -> u64 {
        3 + self.header_bits() + hist.data_bits(&self.lit_lengths, &self.dist_lengths)
    }

    fn write_header(&self, writer: &mut BitWriter, cl: &HuffmanCode) {
        writer.write_bits((self.hlit - 257) as u32, 5);
        writer.write_bits((self.hdist - 1) as u32, 5);
        writer.write_bits((self.hclen - 4) as u32, 4);
        for &sym in &CL_ORDER[..self.hclen] {
            writer.write_bits(u32::from(self.cl_lengths[sym]), 3);
        }
        for &(symbol, extra) in &self.rle {
            cl.write(writer, usize::from(symbol));
            writer.write_bits(u32::from(extra), rle_extra_bits(symbol) as u32);
        }
    }
}

fn last_used(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&len| len != 0).map_or(0, |i| i + 1)
}

fn rle_extra_bits(symbol: u8) -> u64 {
    match symbol {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0,
    }
}

/// Encode a code length sequence with the repeat codes 16, 17 and 18.
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lengths.len() {
        let value = lengths[i];
        let mut run = lengths[i..].iter().take_while(|&&len| len == value).count();
        i += run;

        if value == 0 {
            while run >= 11 {
                let n = run.min(138);
                out.push((18, (n - 11) as u8));
                run -= n;
            }
            if run >= 3 {
                out.push((17, (run - 3) as u8));
                run = 0;
            }
        } else {
            out.push((value, 0));
            run -= 1;
            while run >= 3 {
                let n = run.min(6);
                out.push((16, (n - 3) as u8));
                run -= n;
            }
        }
        out.extend(std::iter::repeat((value, 0)).take(run));
    }
    out
}

fn fixed_cost(hist: &Histogram) -> u64 {
    3 + hist.data_bits(&FIXED_LIT_LENGTHS, &FIXED_DIST_LENGTHS)
}

/// Cost of `len` bytes as stored blocks starting `bit_pos` bits into a byte.
fn stored_cost(len: usize, bit_pos: u32) -> u64 {
    let mut pos = u64::from(bit_pos);
    let mut total = 0;
    let mut remaining = len;
    loop {
        let chunk = remaining.min(MAX_STORED_BLOCK);
        let pad = (8 - (pos + 3) % 8) % 8;
        total += 3 + pad + 32 + 8 * chunk as u64;
        pos = 0;
        remaining -= chunk;
        if remaining == 0 {
            return total;
        }
    }
}

/// Estimated size in bits of `tokens` as one Huffman block.
pub(crate) fn estimate_bits(tokens: &[Token]) -> u64 {
    let hist = Histogram::from_tokens(tokens);
    DynamicPlan::new(&hist).cost(&hist).min(fixed_cost(&hist))
}

/// Write one block for `raw`, whose LZ77 parse is `tokens`.
///
/// `BlockType::Dynamic` writes whichever encoding is cheapest; the other
/// types force their encoding. Returns the encoding actually written.
pub(crate) fn write_block(
    writer: &mut BitWriter,
    raw: &[u8],
    tokens: &[Token],
    final_block: bool,
    block_type: BlockType,
) -> BlockType {
    if block_type == BlockType::Stored {
        write_stored(writer, raw, final_block);
        return BlockType::Stored;
    }

    if block_type == BlockType::Fixed {
        write_fixed(writer, tokens, final_block);
        return BlockType::Fixed;
    }

    let hist = Histogram::from_tokens(tokens);
    let plan = DynamicPlan::new(&hist);
    let dynamic = plan.cost(&hist);
    let fixed = fixed_cost(&hist);
    let stored = stored_cost(raw.len(), writer.bit_pos());
    debug!(raw = raw.len(), stored, fixed, dynamic, "block costs");

    if stored < fixed && stored < dynamic {
        write_stored(writer, raw, final_block);
        BlockType::Stored
    } else if fixed < dynamic {
        write_fixed(writer, tokens, final_block);
        BlockType::Fixed
    } else {
        write_dynamic(writer, tokens, final_block, &plan);
        BlockType::Dynamic
    }
}

fn write_stored(writer: &mut BitWriter, raw: &[u8], final_block: bool) {
    let mut chunks = raw.chunks(MAX_STORED_BLOCK).peekable();
    if chunks.peek().is_none() {
        write_stored_chunk(writer, &[], final_block);
        return;
    }
    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        write_stored_chunk(writer, chunk, final_block && last);
    }
}

fn write_stored_chunk(writer: &mut BitWriter, chunk: &[u8], final_block: bool) {
    writer.write_bits(u32::from(final_block), 1);
    writer.write_bits(BTYPE_STORED, 2);
    writer.align();
    let len = chunk.len() as u16;
    writer.write_bytes(&len.to_le_bytes());
    writer.write_bytes(&(!len).to_le_bytes());
    writer.write_bytes(chunk);
}

fn write_fixed(writer: &mut BitWriter, tokens: &[Token], final_block: bool) {
    writer.write_bits(u32::from(final_block), 1);
    writer.write_bits(BTYPE_FIXED, 2);
    let lit = HuffmanCode::from_lengths(&FIXED_LIT_LENGTHS);
    let dist = HuffmanCode::from_lengths(&FIXED_DIST_LENGTHS);
    write_tokens(writer, tokens, &lit, &dist);
}

fn write_dynamic(writer: &mut BitWriter, tokens: &[Token], final_block: bool, plan: &DynamicPlan) {
    writer.write_bits(u32::from(final_block), 1);
    writer.write_bits(BTYPE_DYNAMIC, 2);
    let cl = HuffmanCode::from_lengths(&plan.cl_lengths);
    plan.write_header(writer, &cl);
    let lit = HuffmanCode::from_lengths(&plan.lit_lengths);
    let dist = HuffmanCode::from_lengths(&plan.dist_lengths);
    write_tokens(writer, tokens, &lit, &dist);
}

fn write_tokens(writer: &mut BitWriter, tokens: &[Token], lit: &HuffmanCode, dist: &HuffmanCode) {
    for token in tokens {
        match *token {
            Token::Literal(b) => lit.write(writer, usize::from(b)),
            Token::Match { length, distance } => {
                let li = length_index(length);
                lit.write(writer, 257 + li);
                writer.write_bits(
                    u32::from(length - LENGTH_BASE[li]),
                    u32::from(LENGTH_EXTRA[li]),
                );
                let di = distance_index(distance);
                dist.write(writer, di);
                writer.write_bits(
                    u32::from(distance - DISTANCE_BASE[di]),
                    u32::from(DISTANCE_EXTRA[di]),
                );
            }
        }
    }
    lit.write(writer, END_OF_BLOCK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::lz77::{tokenize, LzParams};
    use std::io::Read;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::DeflateDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    fn encode(raw: &[u8], block_type: BlockType) -> (Vec<u8>, BlockType) {
        let tokens = tokenize(raw, 0, raw.len(), LzParams::from_iterations(15));
        let mut writer = BitWriter::new();
        let written = write_block(&mut writer, raw, &tokens, true, block_type);
        (writer.finish().0, written)
    }

    fn noise(len: usize) -> Vec<u8> {
        let mut state = 0x2545_F491u32;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect()
    }

    // --- Symbol lookup ---

    #[test]
    fn length_and_distance_indices() {
        assert_eq!(length_index(3), 0);
        assert_eq!(length_index(10), 7);
        assert_eq!(length_index(11), 8);
        assert_eq!(length_index(257), 27);
        assert_eq!(length_index(258), 28);
        assert_eq!(distance_index(1), 0);
        assert_eq!(distance_index(5), 4);
        assert_eq!(distance_index(32768), 29);
    }

    #[test]
    fn rle_uses_repeat_codes() {
        assert_eq!(run_length_encode(&[0; 20]), vec![(18, 9)]);
        assert_eq!(run_length_encode(&[0; 5]), vec![(17, 2)]);
        assert_eq!(run_length_encode(&[5; 8]), vec![(5, 0), (16, 3), (5, 0)]);
        assert_eq!(run_length_encode(&[4, 4, 0, 0]), vec![(4, 0), (4, 0), (0, 0), (0, 0)]);
    }

    // --- Encodings ---

    #[test]
    fn empty_final_block_is_fixed() {
        let (data, written) = encode(&[], BlockType::Dynamic);
        assert_eq!(written, BlockType::Fixed);
        assert_eq!(data, vec![0x03, 0x00]);
    }

    #[test]
    fn text_round_trips_in_every_encoding() {
        let raw = b"It was the best of times, it was the worst of times, it was the age of wisdom".repeat(20);
        for block_type in [BlockType::Stored, BlockType::Fixed, BlockType::Dynamic] {
            let (data, _) = encode(&raw, block_type);
            assert_eq!(inflate(&data), raw, "{block_type:?}");
        }
    }

    #[test]
    fn noise_is_stored() {
        let raw = noise(4096);
        let (data, written) = encode(&raw, BlockType::Dynamic);
        assert_eq!(written, BlockType::Stored);
        assert_eq!(inflate(&data), raw);
    }

    #[test]
    fn large_stored_block_is_chunked() {
        let raw = noise(MAX_STORED_BLOCK * 2 + 10);
        let (data, _) = encode(&raw, BlockType::Stored);
        assert_eq!(data.len(), raw.len() + 3 * 5);
        assert_eq!(inflate(&data), raw);
    }

    #[test]
    fn estimate_matches_written_bits() {
        let raw = b"abracadabra, abracadabra, said the magician to the rabbit".repeat(8);
        let tokens = tokenize(&raw, 0, raw.len(), LzParams::from_iterations(15));
        let mut writer = BitWriter::new();
        let written = write_block(&mut writer, &raw, &tokens, true, BlockType::Dynamic);

        assert_ne!(written, BlockType::Stored);
        assert_eq!(writer.bits_written(), estimate_bits(&tokens));
    }
}
