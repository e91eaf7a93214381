//! backend/lz77.rs
//! Hash-chain LZ77 match finder with lazy evaluation.
//!
//! Summary: Produces the literal/match token stream for a byte range.
//! Bytes before the range stay visible as a window, so a range may
//! reference data that earlier blocks of the same stream already encoded.

use crate::backend::constants::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const WINDOW_MASK: usize = WINDOW_SIZE - 1;
const NONE: usize = usize::MAX;

/// One LZ77 symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(u8),
    Match { length: u16, distance: u16 },
}

impl Token {
    /// Number of input bytes this token covers.
    #[inline]
    pub(crate) fn span(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => usize::from(length),
        }
    }
}

/// Search effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LzParams {
    pub max_chain: usize,
    pub nice_length: usize,
    pub lazy: bool,
}

impl LzParams {
    /// Effort for the emitted token stream; scales with `iterations`.
    pub(crate) fn from_iterations(iterations: u32) -> Self {
        let chain = (iterations as usize).saturating_mul(8).clamp(8, 4096);
        Self {
            max_chain: chain,
            nice_length: MAX_MATCH,
            lazy: true,
        }
    }

    /// Cheap pass used only to estimate where blocks should be split.
    pub(crate) fn quick() -> Self {
        Self {
            max_chain: 8,
            nice_length: 32,
            lazy: false,
        }
    }
}

struct MatchFinder {
    head: Vec<usize>,
    prev: Vec<usize>,
    params: LzParams,
}

impl MatchFinder {
    fn new(params: LzParams) -> Self {
        Self {
            head: vec![NONE; HASH_SIZE],
            prev: vec![NONE; WINDOW_SIZE],
            params,
        }
    }

    #[inline]
    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let h = hash3(data, pos);
        self.prev[pos & WINDOW_MASK] = self.head[h];
        self.head[h] = pos;
    }

    /// Longest match for `pos` that does not run past `end`.
    fn longest_match(&self, data: &[u8], pos: usize, end: usize) -> (usize, usize) {
        if pos + MIN_MATCH > end {
            return (0, 0);
        }
        let max_len = (end - pos).min(MAX_MATCH);
        let nice = self.params.nice_length.min(max_len);

        let mut candidate = self.head[hash3(data, pos)];
        let mut chain = self.params.max_chain;
        let (mut best_len, mut best_dist) = (0, 0);

        while candidate != NONE && candidate < pos && chain > 0 {
            let distance = pos - candidate;
            if distance > WINDOW_SIZE {
                break;
            }

            let len = match_length(data, candidate, pos, max_len);
            if len > best_len {
                best_len = len;
                best_dist = distance;
                if len >= nice {
                    break;
                }
            }

            let next = self.prev[candidate & WINDOW_MASK];
            // slot reused by a newer position: the chain ends here
            if next == NONE || next >= candidate {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        if best_len >= MIN_MATCH {
            (best_len, best_dist)
        } else {
            (0, 0)
        }
    }
}

/// Tokenize `data[start..end]`, using up to one window of bytes before `start`.
pub(crate) fn tokenize(data: &[u8], start: usize, end: usize, params: LzParams) -> Vec<Token> {
    let mut tokens = Vec::with_capacity((end - start) / 2 + 1);
    let mut finder = MatchFinder::new(params);

    for pos in start.saturating_sub(WINDOW_SIZE)..start {
        finder.insert(data, pos);
    }

    let mut pos = start;
    while pos < end {
        let (len, dist) = finder.longest_match(data, pos, end);
        finder.insert(data, pos);

        if len >= MIN_MATCH && params.lazy && len < params.nice_length && pos + 1 < end {
            let (next_len, _) = finder.longest_match(data, pos + 1, end);
            if next_len > len {
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
                continue;
            }
        }

        if len >= MIN_MATCH {
            tokens.push(Token::Match {
                length: len as u16,
                distance: dist as u16,
            });
            for p in pos + 1..pos + len {
                finder.insert(data, p);
            }
            pos += len;
        } else {
            tokens.push(Token::Literal(data[pos]));
            pos += 1;
        }
    }
    tokens
}

#[inline]
fn hash3(data: &[u8], pos: usize) -> usize {
    let b0 = usize::from(data[pos]);
    let b1 = usize::from(data[pos + 1]);
    let b2 = usize::from(data[pos + 2]);
    ((b0 << 10) ^ (b1 << 5) ^ b2) & (HASH_SIZE - 1)
}

#[inline]
fn match_length(data: &[u8], candidate: usize, pos: usize, max_len: usize) -> usize {
    data[candidate..candidate + max_len]
        .iter()
        .zip(&data[pos..pos + max_len])
        .take_while(|(a, b)| a == b)
        .count()
}
