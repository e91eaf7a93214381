//! backend/bitwriter.rs
//! LSB-first bit packing for DEFLATE output.
//!
//! Summary: A writer can be resumed from the partial tail byte of an
//! existing stream, so consecutive blocks share that byte bit-exactly.

/// Bit writer that accumulates into a fresh byte vector.
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    data: Vec<u8>,
    bit_buf: u64,
    bit_count: u32,
    written: u64,
}

impl BitWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resume after a stream whose last byte holds `bits` valid low bits.
    pub(crate) fn resume(tail: u8, bits: u8) -> Self {
        let bits = u32::from(bits & 7);
        Self {
            data: Vec::new(),
            bit_buf: u64::from(tail) & ((1u64 << bits) - 1),
            bit_count: bits,
            written: 0,
        }
    }

    /// Write the low `n` bits of `value`, least significant first.
    #[inline]
    pub(crate) fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32);
        if n == 0 {
            return;
        }
        let masked = u64::from(value) & ((1u64 << n) - 1);
        self.bit_buf |= masked << self.bit_count;
        self.bit_count += n;
        self.written += u64::from(n);

        while self.bit_count >= 8 {
            self.data.push(self.bit_buf as u8);
            self.bit_buf >>= 8;
            self.bit_count -= 8;
        }
    }

    /// Pad with zero bits up to the next byte boundary.
    pub(crate) fn align(&mut self) {
        if self.bit_count > 0 {
            self.written += u64::from(8 - self.bit_count);
            self.data.push(self.bit_buf as u8);
            self.bit_buf = 0;
            self.bit_count = 0;
        }
    }

    /// Write raw bytes. Must be byte-aligned.
    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bit_count, 0);
        self.data.extend_from_slice(bytes);
        self.written += 8 * bytes.len() as u64;
    }

    /// Position inside the current byte (0..=7).
    pub(crate) fn bit_pos(&self) -> u32 {
        self.bit_count
    }

    /// Number of bits written since construction or resume, padding included.
    pub(crate) fn bits_written(&self) -> u64 {
        self.written
    }

    /// Flush the partial byte, returning the bytes and the new cursor.
    pub(crate) fn finish(mut self) -> (Vec<u8>, u8) {
        let bit_pos = self.bit_count as u8;
        if self.bit_count > 0 {
            self.data.push(self.bit_buf as u8);
        }
        (self.data, bit_pos)
    }
}
