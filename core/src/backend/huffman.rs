//! backend/huffman.rs
//! Length-limited Huffman code construction for DEFLATE trees.
//!
//! Summary: Code lengths come from a plain Huffman tree; depths beyond the
//! alphabet limit are folded back while keeping the Kraft sum exact, so
//! every code produced here is complete.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::backend::bitwriter::BitWriter;

/// Longest literal/length or distance code.
pub(crate) const MAX_CODE_BITS: u8 = 15;

/// Longest code-length code.
pub(crate) const MAX_CL_BITS: u8 = 7;

/// Fixed literal/length code lengths (RFC 1951 section 3.2.6).
pub(crate) const FIXED_LIT_LENGTHS: [u8; 288] = {
    let mut lengths = [0u8; 288];
    let mut i = 0;
    while i < 144 {
        lengths[i] = 8;
        i += 1;
    }
    while i < 256 {
        lengths[i] = 9;
        i += 1;
    }
    while i < 280 {
        lengths[i] = 7;
        i += 1;
    }
    while i < 288 {
        lengths[i] = 8;
        i += 1;
    }
    lengths
};

/// Fixed distance code lengths.
pub(crate) const FIXED_DIST_LENGTHS: [u8; 32] = [5; 32];

/// Compute code lengths for `freqs`, no longer than `max_bits`.
///
/// Unused symbols get length 0. A single used symbol gets length 1.
pub(crate) fn code_lengths(freqs: &[u32], max_bits: u8) -> Vec<u8> {
    let mut lengths = vec![0u8; freqs.len()];

    // (frequency, symbol), ascending: the rarest symbols take the longest codes
    let mut leaves: Vec<(u32, usize)> = freqs
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > 0)
        .map(|(sym, &f)| (f, sym))
        .collect();

    match leaves.len() {
        0 => return lengths,
        1 => {
            lengths[leaves[0].1] = 1;
            return lengths;
        }
        _ => {}
    }
    leaves.sort_unstable();

    let n = leaves.len();
    let mut parent = vec![0usize; 2 * n - 1];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = leaves
        .iter()
        .enumerate()
        .map(|(node, &(f, _))| Reverse((u64::from(f), node)))
        .collect();

    let mut next = n;
    while heap.len() > 1 {
        let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((wa + wb, next)));
        next += 1;
    }

    // Parents are always created after their children.
    let root = next - 1;
    let mut depth = vec![0usize; 2 * n - 1];
    for node in (0..root).rev() {
        depth[node] = depth[parent[node]] + 1;
    }

    let max = usize::from(max_bits);
    let mut bl_count = vec![0u32; max + 1];
    for &d in &depth[..n] {
        bl_count[d.min(max)] += 1;
    }

    let full = 1u64 << max;
    let mut total: u64 = (1..=max).map(|len| u64::from(bl_count[len]) << (max - len)).sum();
    while total > full {
        bl_count[max] -= 1;
        for len in (1..max).rev() {
            if bl_count[len] != 0 {
                bl_count[len] -= 1;
                bl_count[len + 1] += 2;
                break;
            }
        }
        total -= 1;
    }

    let mut leaf = 0;
    for len in (1..=max).rev() {
        for _ in 0..bl_count[len] {
            lengths[leaves[leaf].1] = len as u8;
            leaf += 1;
        }
    }
    lengths
}

/// Give the tree at least two codes so that it is complete.
///
/// Some decoders reject a code-length or distance tree with fewer codes.
pub(crate) fn ensure_two_codes(lengths: &mut [u8]) {
    let used = lengths.iter().filter(|&&len| len > 0).count();
    match used {
        0 => {
            lengths[0] = 1;
            lengths[1] = 1;
        }
        1 => {
            let spare = if lengths[0] == 0 { 0 } else { 1 };
            lengths[spare] = 1;
        }
        _ => {}
    }
}

/// Canonical code table with bit-reversed codewords ready for LSB-first output.
#[derive(Debug, Clone)]
pub(crate) struct HuffmanCode {
    codes: Vec<u16>,
    lengths: Vec<u8>,
}

impl HuffmanCode {
    pub(crate) fn from_lengths(lengths: &[u8]) -> Self {
        let mut bl_count = [0u32; 16];
        for &len in lengths {
            if len > 0 {
                bl_count[usize::from(len)] += 1;
            }
        }

        let mut next_code = [0u32; 16];
        let mut code = 0u32;
        for bits in 1..16 {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let codes = lengths
            .iter()
            .map(|&len| {
                if len == 0 {
                    return 0;
                }
                let code = next_code[usize::from(len)];
                next_code[usize::from(len)] += 1;
                reverse_bits(code, len) as u16
            })
            .collect();

        Self {
            codes,
            lengths: lengths.to_vec(),
        }
    }

    #[inline]
    pub(crate) fn write(&self, writer: &mut BitWriter, symbol: usize) {
        debug_assert!(self.lengths[symbol] > 0, "symbol {symbol} has no code");
        writer.write_bits(u32::from(self.codes[symbol]), u32::from(self.lengths[symbol]));
    }
}

fn reverse_bits(code: u32, bits: u8) -> u32 {
    let mut result = 0;
    let mut code = code;
    for _ in 0..bits {
        result = (result << 1) | (code & 1);
        code >>= 1;
    }
    result
}
