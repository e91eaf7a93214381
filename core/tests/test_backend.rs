#[cfg(test)]
mod tests {
    use std::io::Read;

    use deflate_stream_core::backend::{
        BackendError, BackendOptions, BlockType, DeflateBackend, PartialOutput, StandardBackend,
    };
    use deflate_stream_core::compression::Format;
    use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        DeflateDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    fn text(len: usize) -> Vec<u8> {
        b"Pack my box with five dozen liquor jugs. "
            .iter()
            .cycle()
            .take(len)
            .copied()
            .collect()
    }

    // --- compress_part ---

    #[test]
    fn parts_continue_at_the_cursor() {
        let backend = StandardBackend::new();
        let opts = BackendOptions::default();
        let mut out = PartialOutput::new();

        backend.compress_part(&opts, BlockType::Dynamic, false, b"first, ", &mut out).unwrap();
        backend.compress_part(&opts, BlockType::Fixed, false, b"second, ", &mut out).unwrap();
        backend.compress_part(&opts, BlockType::Stored, false, b"third, ", &mut out).unwrap();
        backend.compress_part(&opts, BlockType::Dynamic, true, b"last", &mut out).unwrap();

        assert_eq!(inflate(out.as_bytes()), b"first, second, third, last");
    }

    #[test]
    fn cursor_tracks_bits_written() {
        let backend = StandardBackend::new();
        let mut out = PartialOutput::new();
        backend
            .compress_part(&BackendOptions::default(), BlockType::Fixed, true, b"", &mut out)
            .unwrap();
        // 3 header bits + 7-bit end-of-block code
        assert_eq!(out.len(), 2);
        assert_eq!(out.bit_pos(), 2);
    }

    #[test]
    fn invalid_cursor_is_reported() {
        assert_eq!(
            PartialOutput::from_parts(Vec::new(), 5).unwrap_err(),
            BackendError::InvalidCursor { bit_pos: 5, len: 0 }
        );
    }

    #[test]
    fn splice_replaces_open_byte() {
        let mut out = PartialOutput::from_parts(vec![0xF0, 0x01], 1).unwrap();
        out.splice(&[0x03, 0xAA], 4).unwrap();
        assert_eq!(out.as_bytes(), &[0xF0, 0x03, 0xAA]);
        assert_eq!(out.bit_pos(), 4);
        assert_eq!(out.clone().into_bytes(), vec![0xF0, 0x03, 0xAA]);
    }

    #[test]
    fn block_limit_of_one_still_decodes() {
        let data = text(50_000);
        let opts = BackendOptions {
            block_splitting_max: 1,
            ..BackendOptions::default()
        };
        let mut out = PartialOutput::new();
        StandardBackend.compress_part(&opts, BlockType::Dynamic, true, &data, &mut out).unwrap();
        assert_eq!(inflate(out.as_bytes()), data);
    }

    // --- compress_full ---

    #[test]
    fn framing_per_format() {
        let data = text(10_000);
        let backend = StandardBackend::new();
        let opts = BackendOptions::default();

        let gzip = backend.compress_full(&opts, Format::Gzip, &data).unwrap();
        assert_eq!(&gzip[..3], &[0x1F, 0x8B, 0x08]);
        let mut decoded = Vec::new();
        GzDecoder::new(&gzip[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, data);

        let zlib = backend.compress_full(&opts, Format::Zlib, &data).unwrap();
        assert_eq!(&zlib[..2], &[0x78, 0xDA]);
        let mut decoded = Vec::new();
        ZlibDecoder::new(&zlib[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, data);

        let raw = backend.compress_full(&opts, Format::Deflate, &data).unwrap();
        assert_eq!(&gzip[10..gzip.len() - 8], &raw[..]);
        assert_eq!(&zlib[2..zlib.len() - 4], &raw[..]);
    }

    #[test]
    fn more_effort_never_needs_a_different_decoder() {
        let data = text(30_000);
        for iterations in [1, 15, 200] {
            for (splitting, last) in [(false, false), (true, false), (true, true)] {
                let opts = BackendOptions {
                    iterations,
                    block_splitting: splitting,
                    block_splitting_last: last,
                    ..BackendOptions::default()
                };
                let out = StandardBackend.compress_full(&opts, Format::Deflate, &data).unwrap();
                assert_eq!(inflate(&out), data, "{opts:?}");
            }
        }
    }

    #[test]
    fn incompressible_input_falls_back_to_stored() {
        let mut state = 0xDEAD_BEEFu32;
        let data: Vec<u8> = (0..20_000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let out = StandardBackend
            .compress_full(&BackendOptions::default(), Format::Deflate, &data)
            .unwrap();
        // stored blocks cost five bytes each on top of the payload
        assert!(out.len() <= data.len() + 5 * 16, "{} bytes", out.len());
        assert_eq!(inflate(&out), data);
    }
}
