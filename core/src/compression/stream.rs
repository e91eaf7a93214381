//! compression/stream.rs
//! Streaming helpers that respect chunk_size discipline.
use std::io::{ErrorKind, Read};

use crate::compression::types::StreamCompressor;
use crate::constants::MAX_CHUNK_SIZE;
use crate::types::CompressError;

/// Summary: Read `reader` in `chunk_size` blocks, submit each one and yield
/// the non-empty outputs, then yield the finalize output exactly once.
/// - `chunk_size` must be in `1..=MAX_CHUNK_SIZE`.
/// - The iterator ends after the first error.
pub fn compress_stream<'a, R, C>(
    mut reader: R,
    chunk_size: usize,
    compressor: &'a C,
) -> Result<impl Iterator<Item = Result<Vec<u8>, CompressError>> + 'a, CompressError>
where
    R: Read + 'a,
    C: StreamCompressor + ?Sized,
{
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(CompressError::InvalidArgument(format!(
            "chunk size {chunk_size} outside 1..={MAX_CHUNK_SIZE}"
        )));
    }
    let mut buf = vec![0u8; chunk_size];
    let mut done = false;

    Ok(std::iter::from_fn(move || {
        while !done {
            let n = match read_full(&mut reader, &mut buf) {
                Ok(n) => n,
                Err(e) => {
                    done = true;
                    return Some(Err(e.into()));
                }
            };

            if n == 0 {
                done = true;
                return Some(compressor.finalize());
            }
            match compressor.submit(&buf[..n]) {
                Ok(out) if out.is_empty() => continue,
                Ok(out) => return Some(Ok(out)),
                Err(e) => {
                    done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }))
}

/// Collect `compress_stream` into one buffer.
pub fn compress_to_vec<R, C>(reader: R, chunk_size: usize, compressor: &C) -> Result<Vec<u8>, CompressError>
where
    R: Read,
    C: StreamCompressor + ?Sized,
{
    let mut out = Vec::new();
    for piece in compress_stream(reader, chunk_size, compressor)? {
        let piece = piece?;
        out.try_reserve(piece.len())?;
        out.extend_from_slice(&piece);
    }
    Ok(out)
}

/// Fill `buf` as far as the reader allows; short only at end of input.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
