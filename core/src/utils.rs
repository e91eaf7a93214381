//! utils.rs
//! Checksums used by the container framing.

/// Adler-32 modulus.
const ADLER_MOD: u32 = 65_521;

/// Largest n with 255 n (n + 1) / 2 + (n + 1)(ADLER_MOD - 1) < 2^32.
const ADLER_NMAX: usize = 5_552;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChecksumAlg {
    /// gzip trailer
    Crc32 = 0x0001,
    /// zlib trailer
    Adler32 = 0x0002,
}

pub fn compute_checksum(data: &[u8], alg: ChecksumAlg) -> u32 {
    match alg {
        ChecksumAlg::Crc32 => compute_crc32(data),
        ChecksumAlg::Adler32 => compute_adler32(data),
    }
}

fn compute_crc32(data: &[u8]) -> u32 {
    use crc32fast::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn compute_adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for chunk in data.chunks(ADLER_NMAX) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }
    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adler32_known_values() {
        assert_eq!(compute_checksum(b"", ChecksumAlg::Adler32), 1);
        assert_eq!(compute_checksum(b"Wikipedia", ChecksumAlg::Adler32), 0x11E6_0398);
    }

    #[test]
    fn adler32_long_input_stays_reduced() {
        let data = vec![0xFFu8; 100_000];
        let sum = compute_checksum(&data, ChecksumAlg::Adler32);
        assert!(sum & 0xFFFF < ADLER_MOD);
        assert!(sum >> 16 < ADLER_MOD);
    }

    #[test]
    fn crc32_known_value() {
        assert_eq!(compute_checksum(b"123456789", ChecksumAlg::Crc32), 0xCBF4_3926);
    }
}
