#[cfg(test)]
mod tests {
    use std::io::Read;

    use deflate_stream_core::backend::{
        BackendError, BackendOptions, BlockType, DeflateBackend, PartialOutput, StandardBackend,
    };
    use deflate_stream_core::compression::{
        BlockSplitting, BufferingCompressor, CompressionOptions, Format,
    };
    use deflate_stream_core::types::CompressError;
    use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
    use proptest::prelude::*;

    fn inflate(format: Format, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        match format {
            Format::Gzip => GzDecoder::new(data).read_to_end(&mut out),
            Format::Zlib => ZlibDecoder::new(data).read_to_end(&mut out),
            Format::Deflate => DeflateDecoder::new(data).read_to_end(&mut out),
        }
        .unwrap();
        out
    }

    fn sample_text(len: usize) -> Vec<u8> {
        const WORDS: [&str; 8] = ["stream ", "block ", "huffman ", "window ", "deflate ", "bit ", "chunk ", "final "];
        let mut state = 0x9E37_79B9u32;
        let mut out = Vec::with_capacity(len + 16);
        while out.len() < len {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            out.extend_from_slice(WORDS[(state % 8) as usize].as_bytes());
        }
        out.truncate(len);
        out
    }

    fn compress_all(options: CompressionOptions, chunks: &[&[u8]]) -> Vec<u8> {
        let compressor = BufferingCompressor::new(options);
        for chunk in chunks {
            assert!(compressor.submit(chunk).unwrap().is_empty());
        }
        compressor.finalize().unwrap()
    }

    /// Always fails inside the primitive.
    struct FailingBackend;

    impl DeflateBackend for FailingBackend {
        fn compress_full(&self, _: &BackendOptions, _: Format, _: &[u8]) -> Result<Vec<u8>, BackendError> {
            Err(BackendError::Resource("out of memory".into()))
        }

        fn compress_part(
            &self,
            _: &BackendOptions,
            _: BlockType,
            _: bool,
            _: &[u8],
            _: &mut PartialOutput,
        ) -> Result<(), BackendError> {
            Err(BackendError::Resource("out of memory".into()))
        }
    }

    // --- Round trips ---

    #[test]
    fn every_format_round_trips() {
        let data = sample_text(20_000);
        for format in [Format::Gzip, Format::Zlib, Format::Deflate] {
            let options = CompressionOptions::new().with_format(format);
            let out = compress_all(options, &[&data[..7000], &data[7000..7001], &data[7001..]]);
            assert!(out.len() < data.len() / 2, "{format}: {} bytes", out.len());
            assert_eq!(inflate(format, &out), data, "{format}");
        }
    }

    #[test]
    fn every_splitting_mode_round_trips() {
        let data = sample_text(12_000);
        for mode in [
            BlockSplitting::Disabled,
            BlockSplitting::Enabled,
            BlockSplitting::EnabledLast,
            BlockSplitting::Auto,
        ] {
            let options = CompressionOptions::new()
                .with_format(Format::Zlib)
                .with_block_splitting(mode);
            assert_eq!(inflate(Format::Zlib, &compress_all(options, &[&data])), data, "{mode:?}");
        }
    }

    #[test]
    fn input_beyond_one_master_block_round_trips() {
        let data = sample_text(1_200_000);
        let options = CompressionOptions::new()
            .with_format(Format::Gzip)
            .with_iterations(1)
            .with_block_splitting(BlockSplitting::Disabled);
        assert_eq!(inflate(Format::Gzip, &compress_all(options, &[&data])), data);
    }

    // --- Empty input ---

    #[test]
    fn empty_deflate_stream_is_minimal() {
        let out = compress_all(CompressionOptions::new(), &[]);
        assert_eq!(out, vec![0x03, 0x00]);
        assert!(inflate(Format::Deflate, &out).is_empty());
    }

    #[test]
    fn empty_zlib_stream_is_minimal() {
        let out = compress_all(CompressionOptions::new().with_format(Format::Zlib), &[b""]);
        assert_eq!(out, vec![0x78, 0xDA, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
        assert!(inflate(Format::Zlib, &out).is_empty());
    }

    #[test]
    fn empty_gzip_stream_is_minimal() {
        let out = compress_all(CompressionOptions::new().with_format(Format::Gzip), &[]);
        assert_eq!(
            out,
            vec![
                0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, 0x03, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ]
        );
        assert!(inflate(Format::Gzip, &out).is_empty());
    }

    // --- Construction ---

    #[test]
    fn unknown_format_is_rejected() {
        for raw in [-1, 3, 42] {
            let err = BufferingCompressor::from_raw(raw, false, 15, 1, 15).unwrap_err();
            assert!(matches!(err, CompressError::InvalidArgument(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn out_of_range_splitting_behaves_as_enabled() {
        let data = sample_text(8_000);
        let reference = {
            let c = BufferingCompressor::from_raw(2, false, 15, 1, 15).unwrap();
            c.submit(&data).unwrap();
            c.finalize().unwrap()
        };
        for raw in [-1, 4, 100] {
            let c = BufferingCompressor::from_raw(2, false, 15, raw, 15).unwrap();
            assert_eq!(c.options().block_splitting, BlockSplitting::Enabled);
            c.submit(&data).unwrap();
            assert_eq!(c.finalize().unwrap(), reference, "{raw}");
        }
    }

    // --- Auto splitting ---

    #[test]
    fn auto_is_no_larger_than_either_candidate() {
        let mut data = sample_text(30_000);
        data.extend((0..30_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8));
        let backend = StandardBackend::new();
        let base = BackendOptions::default();
        let first = backend
            .compress_full(&BackendOptions { block_splitting_last: false, ..base }, Format::Deflate, &data)
            .unwrap();
        let second = backend
            .compress_full(&BackendOptions { block_splitting_last: true, ..base }, Format::Deflate, &data)
            .unwrap();

        let out = compress_all(
            CompressionOptions::new().with_block_splitting(BlockSplitting::Auto),
            &[&data],
        );
        assert!(out.len() <= first.len().min(second.len()));
        assert_eq!(out, if first.len() < second.len() { first } else { second });
        assert_eq!(inflate(Format::Deflate, &out), data);
    }

    // --- State machine ---

    #[test]
    fn use_after_finalize_fails() {
        let compressor = BufferingCompressor::new(CompressionOptions::new());
        compressor.submit(b"abc").unwrap();
        compressor.finalize().unwrap();
        assert!(compressor.is_finalized());

        let err = compressor.submit(b"more").unwrap_err();
        assert!(matches!(err, CompressError::InvalidState(_)));
        assert_eq!(err.to_string(), "Compressor has been flushed");

        let err = compressor.finalize().unwrap_err();
        assert_eq!(err.to_string(), "repeated call to flush()");
    }

    #[test]
    fn failed_finalize_still_finalizes() {
        let compressor = BufferingCompressor::with_backend(CompressionOptions::new(), FailingBackend);
        compressor.submit(b"payload").unwrap();

        let err = compressor.finalize().unwrap_err();
        assert!(matches!(err, CompressError::Backend(BackendError::Resource(_))));
        assert!(compressor.is_finalized());
        assert!(matches!(compressor.finalize().unwrap_err(), CompressError::InvalidState(_)));
        assert!(matches!(compressor.submit(b"x").unwrap_err(), CompressError::InvalidState(_)));
    }

    #[test]
    fn telemetry_counts_calls() {
        let compressor = BufferingCompressor::new(
            CompressionOptions::new().with_block_splitting(BlockSplitting::Auto),
        );
        compressor.submit(b"hello ").unwrap();
        compressor.submit(b"world").unwrap();
        let out = compressor.finalize().unwrap();

        let snapshot = compressor.telemetry().unwrap();
        assert_eq!(snapshot.chunks_submitted, 2);
        assert_eq!(snapshot.bytes_in, 11);
        assert_eq!(snapshot.bytes_out, out.len() as u64);
        assert_eq!(snapshot.backend_calls, 2);
        assert!(snapshot.finalized);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn any_chunking_round_trips(
            data in proptest::collection::vec(any::<u8>(), 0..4096),
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..6),
            format in prop_oneof![Just(Format::Gzip), Just(Format::Zlib), Just(Format::Deflate)],
            splitting in 0i32..4,
        ) {
            let mut points: Vec<usize> = cuts.iter().map(|i| i.index(data.len() + 1)).collect();
            points.sort_unstable();

            let compressor = BufferingCompressor::from_raw(format as i32, false, 3, splitting, 15).unwrap();
            let mut start = 0;
            for &p in points.iter().chain(std::iter::once(&data.len())) {
                prop_assert!(compressor.submit(&data[start..p]).unwrap().is_empty());
                start = p;
            }
            let out = compressor.finalize().unwrap();
            prop_assert_eq!(inflate(format, &out), data);
        }

        #[test]
        fn auto_never_loses_to_a_single_pass(
            text_len in 0usize..6000,
            noise in proptest::collection::vec(any::<u8>(), 0..3000),
            format in prop_oneof![Just(Format::Gzip), Just(Format::Zlib), Just(Format::Deflate)],
            max_blocks in 0i32..6,
        ) {
            let mut data = sample_text(text_len);
            data.extend_from_slice(&noise);

            let options = CompressionOptions::new()
                .with_format(format)
                .with_iterations(2)
                .with_block_splitting(BlockSplitting::Auto)
                .with_block_splitting_max(max_blocks);
            let base = BackendOptions {
                iterations: 2,
                block_splitting_max: max_blocks as u32,
                ..BackendOptions::default()
            };
            let backend = StandardBackend::new();
            let first = backend.compress_full(&base, format, &data).unwrap();
            let second = backend
                .compress_full(&BackendOptions { block_splitting_last: true, ..base }, format, &data)
                .unwrap();

            let out = compress_all(options, &[&data]);
            prop_assert!(out.len() <= first.len().min(second.len()));
            prop_assert_eq!(inflate(format, &out), data);
        }
    }
}
