//! backend/split.rs
//! Block splitting on estimated Huffman cost.
//!
//! Summary: Repeatedly takes the largest segment that may still improve,
//! searches the split point that minimizes the summed cost of its two
//! halves, and keeps it only if the halves are cheaper than the whole.

use tracing::trace;

use crate::backend::block::estimate_bits;
use crate::backend::lz77::Token;

/// Segments shorter than this are never split.
const MIN_SPLIT_TOKENS: usize = 10;

/// Below this span every position is tried.
const BRUTE_FORCE_LIMIT: usize = 1024;

const NUM_SAMPLES: usize = 9;

/// Token indices at which new blocks start, ascending.
///
/// At most `max_blocks - 1` points are returned; `max_blocks == 0` means
/// no limit.
pub(crate) fn find_split_points(tokens: &[Token], max_blocks: usize) -> Vec<usize> {
    let mut splits: Vec<usize> = Vec::new();
    if tokens.len() < MIN_SPLIT_TOKENS {
        return splits;
    }
    let mut done = vec![false; tokens.len()];

    loop {
        if max_blocks > 0 && splits.len() + 1 >= max_blocks {
            break;
        }
        let Some((start, end)) = largest_open_segment(&splits, tokens.len(), &done) else {
            break;
        };

        let whole = estimate_bits(&tokens[start..end]);
        let (split, cost) = find_minimum(
            |i| estimate_bits(&tokens[start..i]) + estimate_bits(&tokens[i..end]),
            start + 1,
            end,
        );
        trace!(start, end, split, whole, cost, "split candidate");

        if cost >= whole || split == start + 1 || split == end {
            done[start] = true;
        } else {
            let at = splits.partition_point(|&s| s < split);
            splits.insert(at, split);
        }
    }
    splits
}

fn largest_open_segment(splits: &[usize], len: usize, done: &[bool]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut start = 0;
    for end in splits.iter().copied().chain(std::iter::once(len)) {
        let size = end - start;
        if !done[start] && size >= MIN_SPLIT_TOKENS && best.map_or(true, |(s, e)| size > e - s) {
            best = Some((start, end));
        }
        start = end;
    }
    best
}

/// Position in `start..end` minimizing `cost`, with that cost.
fn find_minimum<F>(cost: F, start: usize, end: usize) -> (usize, u64)
where
    F: Fn(usize) -> u64,
{
    if end - start <= BRUTE_FORCE_LIMIT {
        return (start..end)
            .map(|i| (i, cost(i)))
            .min_by_key(|&(_, c)| c)
            .unwrap_or((start, u64::MAX));
    }

    let (mut lo, mut hi) = (start, end);
    let mut best = (start, u64::MAX);
    while hi - lo > NUM_SAMPLES {
        let step = (hi - lo) / (NUM_SAMPLES + 1);
        let points: Vec<usize> = (1..=NUM_SAMPLES).map(|k| lo + k * step).collect();
        let Some((idx, c)) = points
            .iter()
            .map(|&p| cost(p))
            .enumerate()
            .min_by_key(|&(_, c)| c)
        else {
            break;
        };
        if c > best.1 {
            break;
        }
        best = (points[idx], c);
        lo = if idx == 0 { lo } else { points[idx - 1] };
        hi = if idx == NUM_SAMPLES - 1 { hi } else { points[idx + 1] };
    }
    best
}
