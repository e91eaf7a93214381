//! backend/container.rs
//! gzip (RFC 1952) and zlib (RFC 1950) framing around a raw DEFLATE body.

use crate::backend::types::BackendError;
use crate::compression::types::Format;
use crate::utils::{compute_checksum, ChecksumAlg};

/// ID1 ID2 CM FLG, MTIME 0, XFL 2 (maximum compression), OS 3 (Unix).
const GZIP_HEADER: [u8; 10] = [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03];

/// CM 8 with a 32K window, FLEVEL 3, no preset dictionary.
const ZLIB_HEADER: [u8; 2] = [0x78, 0xDA];

pub(crate) fn wrap(format: Format, input: &[u8], body: Vec<u8>) -> Result<Vec<u8>, BackendError> {
    let (header, trailer): (&[u8], Vec<u8>) = match format {
        Format::Deflate => return Ok(body),
        Format::Gzip => {
            let crc = compute_checksum(input, ChecksumAlg::Crc32);
            let isize = input.len() as u32;
            let mut trailer = crc.to_le_bytes().to_vec();
            trailer.extend_from_slice(&isize.to_le_bytes());
            (&GZIP_HEADER, trailer)
        }
        Format::Zlib => {
            let adler = compute_checksum(input, ChecksumAlg::Adler32);
            (&ZLIB_HEADER, adler.to_be_bytes().to_vec())
        }
    };

    let mut out = Vec::new();
    out.try_reserve_exact(header.len() + body.len() + trailer.len())
        .map_err(|e| BackendError::Resource(e.to_string()))?;
    out.extend_from_slice(header);
    out.extend_from_slice(&body);
    out.extend_from_slice(&trailer);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_header_check_bits() {
        let cmf_flg = u16::from_be_bytes(ZLIB_HEADER);
        assert_eq!(cmf_flg % 31, 0);
    }

    #[test]
    fn gzip_trailer_layout() {
        let out = wrap(Format::Gzip, b"abc", vec![0x4B, 0x4C, 0x4A, 0x06, 0x00]).unwrap();
        assert_eq!(&out[..10], &GZIP_HEADER);
        assert_eq!(&out[15..19], &0x3524_41C2u32.to_le_bytes());
        assert_eq!(&out[19..], &3u32.to_le_bytes());
    }

    #[test]
    fn raw_is_untouched() {
        let body = vec![0x03, 0x00];
        assert_eq!(wrap(Format::Deflate, b"", body.clone()).unwrap(), body);
    }
}
