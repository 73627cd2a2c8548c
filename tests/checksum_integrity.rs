//! Checksum Integrity Invariant Tests
//!
//! Tests for invariants:
//! - C1: Every chunk is checksummed
//! - C2: Corruption is never ignored
//! - C3: Execution paths are equivalent
//! - C4: Callers' buffer state is untouched
//!
//! Per INTEGRITY.md, verification walks chunks left to right, stops at
//! the first mismatch, and reports the absolute byte offset of the bad
//! chunk.

use std::io::Cursor;

use chunksum::checksum::{
    calculate_chunked_sums, calculate_chunked_sums_slice, calculate_file_chunked_sums,
    is_acceleration_available, verify_chunked_sums, verify_chunked_sums_slice,
    verify_file_chunked_sums, ChecksumAlgorithm, ChunkSpec, SourceInfo, SUM_WIDTH,
};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

const ALGORITHMS: [ChecksumAlgorithm; 2] = [ChecksumAlgorithm::Crc32, ChecksumAlgorithm::Crc32c];

fn sequential_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i & 0xFF) as u8).collect()
}

fn spec(bytes_per_sum: usize, algorithm: ChecksumAlgorithm) -> ChunkSpec {
    ChunkSpec::new(bytes_per_sum, algorithm).unwrap()
}

// =============================================================================
// INVARIANT C1: Every Chunk Is Checksummed
// =============================================================================

/// C1: Stream length is 4 * ceil(len / bytes_per_sum) for every input.
#[test]
fn test_c1_stream_length_law() {
    for algorithm in ALGORITHMS {
        for bytes_per_sum in [1usize, 2, 3, 4, 512] {
            let spec = spec(bytes_per_sum, algorithm);
            for data_len in [0usize, 1, 2, 5, 511, 512, 513, 1024, 1500] {
                let data = sequential_data(data_len);
                let sums = calculate_chunked_sums_slice(&spec, &data);
                let expected_chunks = data_len.div_ceil(bytes_per_sum);
                assert_eq!(
                    sums.len(),
                    SUM_WIDTH * expected_chunks,
                    "C1 VIOLATION: wrong stream length for len {} / chunk {}",
                    data_len,
                    bytes_per_sum
                );
            }
        }
    }
}

/// C1: Empty data yields an empty stream and trivially verifies.
#[test]
fn test_c1_empty_region() {
    let spec = spec(512, ChecksumAlgorithm::Crc32);
    let sums = calculate_chunked_sums_slice(&spec, &[]);
    assert!(sums.is_empty());
    verify_chunked_sums_slice(&spec, &[], &sums, &SourceInfo::unnamed()).unwrap();
}

/// C1: A checksum stream of the wrong length is rejected as a usage
/// error before any chunk is compared.
#[test]
fn test_c1_malformed_stream_rejected() {
    let spec = spec(4, ChecksumAlgorithm::Crc32);
    let data = sequential_data(10);
    let sums = calculate_chunked_sums_slice(&spec, &data);

    for bad_len in [0, 4, sums.len() - 1, sums.len() + 4] {
        let mut bad = sums.clone();
        bad.resize(bad_len, 0);
        let err =
            verify_chunked_sums_slice(&spec, &data, &bad, &SourceInfo::unnamed()).unwrap_err();
        assert_eq!(err.code().code(), "CHUNKSUM_MALFORMED_SUMS");
        assert!(!err.is_fatal(), "C1: sizing mistakes are not corruption");
    }
}

// =============================================================================
// INVARIANT C2: Corruption Is Never Ignored
// =============================================================================

/// C2: verify(calculate(data)) succeeds for assorted shapes.
#[test]
fn test_c2_roundtrip() {
    for algorithm in ALGORITHMS {
        for bytes_per_sum in [1usize, 3, 4, 16, 512] {
            let spec = spec(bytes_per_sum, algorithm);
            for data_len in [0usize, 1, 15, 16, 17, 512, 1500] {
                let data = sequential_data(data_len);
                let sums = calculate_chunked_sums_slice(&spec, &data);
                verify_chunked_sums_slice(&spec, &data, &sums, &SourceInfo::unnamed()).unwrap();
            }
        }
    }
}

/// C2: Flipping any single data byte fails at the containing chunk's
/// start offset, shifted by the region's base position.
#[test]
fn test_c2_single_byte_tamper_located() {
    let bytes_per_sum = 4;
    let base_position = 10_000u64;
    let spec = spec(bytes_per_sum, ChecksumAlgorithm::Crc32c);
    let data = sequential_data(21);
    let sums = calculate_chunked_sums_slice(&spec, &data);

    for k in 0..data.len() {
        let mut tampered = data.clone();
        tampered[k] ^= 0x01;

        let source = SourceInfo::new("segment-0001.log", base_position);
        let err = verify_chunked_sums_slice(&spec, &tampered, &sums, &source).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code().code(), "CHUNKSUM_DATA_CORRUPTION");
        assert_eq!(
            err.position(),
            Some(base_position + (k - k % bytes_per_sum) as u64),
            "C2 VIOLATION: wrong location for tampered byte {}",
            k
        );
        assert_eq!(err.source_name(), Some("segment-0001.log"));
    }
}

/// C2: The worked storage-layer example: two chunks of [01 02 03 04 05],
/// second checksum corrupted, reported at base + 4.
#[test]
fn test_c2_worked_example() {
    let spec = spec(4, ChecksumAlgorithm::Crc32);
    let data = [0x01, 0x02, 0x03, 0x04, 0x05];
    let sums = calculate_chunked_sums_slice(&spec, &data);
    assert_eq!(sums.len(), 8);

    let source = SourceInfo::new("example.dat", 2048);
    verify_chunked_sums_slice(&spec, &data, &sums, &source).unwrap();

    let mut corrupted = sums.clone();
    corrupted[6] ^= 0xFF;
    let err = verify_chunked_sums_slice(&spec, &data, &corrupted, &source).unwrap_err();
    assert_eq!(err.position(), Some(2048 + 4));
}

/// C2: Scanning stops at the first mismatch; later corruption is not
/// reported.
#[test]
fn test_c2_first_mismatch_reported() {
    let spec = spec(8, ChecksumAlgorithm::Crc32);
    let mut data = sequential_data(64);
    let sums = calculate_chunked_sums_slice(&spec, &data);

    data[20] ^= 0xFF; // chunk 2
    data[50] ^= 0xFF; // chunk 6

    let err = verify_chunked_sums_slice(&spec, &data, &sums, &SourceInfo::unnamed()).unwrap_err();
    assert_eq!(err.position(), Some(16));
}

/// C2: An unknown algorithm id is rejected for verify and calculate
/// alike, regardless of data content.
#[test]
fn test_c2_unknown_algorithm_rejected() {
    for id in [0u32, 3, 7, u32::MAX] {
        let err = ChunkSpec::from_id(512, id).unwrap_err();
        assert_eq!(err.code().code(), "CHUNKSUM_UNSUPPORTED_ALGORITHM");
        assert!(!err.is_fatal());
    }
    // Valid ids resolve to the documented algorithms.
    assert_eq!(
        ChunkSpec::from_id(512, 1).unwrap().algorithm(),
        ChecksumAlgorithm::Crc32
    );
    assert_eq!(
        ChunkSpec::from_id(512, 2).unwrap().algorithm(),
        ChecksumAlgorithm::Crc32c
    );
}

/// C2: A non-positive chunk size is a usage error.
#[test]
fn test_c2_invalid_chunk_spec_rejected() {
    let err = ChunkSpec::new(0, ChecksumAlgorithm::Crc32).unwrap_err();
    assert_eq!(err.code().code(), "CHUNKSUM_INVALID_CHUNK_SPEC");
}

// =============================================================================
// INVARIANT C3: Execution Paths Are Equivalent
// =============================================================================

/// C3: Portable and accelerated kernels agree bit for bit, including at
/// sizes where SIMD implementations change code paths.
#[test]
fn test_c3_kernels_agree_at_simd_boundaries() {
    const BOUNDARY_SIZES: &[usize] = &[
        0, 1, 2, 3, 4, 7, 8, 9, 15, 16, 17, 31, 32, 33, 63, 64, 65, 127, 128, 129, 255, 256, 257,
        511, 512, 513, 1023, 1024, 1025, 4095, 4096, 4097,
    ];

    for algorithm in ALGORITHMS {
        for &size in BOUNDARY_SIZES {
            let data = sequential_data(size);
            assert_eq!(
                algorithm.compute_portable(&data),
                algorithm.compute_accelerated(&data),
                "C3 VIOLATION: {} kernels disagree at size {}",
                algorithm.name(),
                size
            );
        }
    }
}

/// C3: The routed compute matches the portable baseline whichever path
/// the probe selected.
#[test]
fn test_c3_routed_compute_matches_baseline() {
    // Evaluate the probe first; the flag must not change afterwards.
    let accelerated = is_acceleration_available();

    for algorithm in ALGORITHMS {
        let data = sequential_data(2048);
        assert_eq!(algorithm.compute(&data), algorithm.compute_portable(&data));
    }

    assert_eq!(is_acceleration_available(), accelerated);
}

/// C3: Whole checksum streams are identical on both paths.
#[test]
fn test_c3_streams_identical_across_paths() {
    let data = sequential_data(1500);
    for algorithm in ALGORITHMS {
        let spec = spec(512, algorithm);
        let routed = calculate_chunked_sums_slice(&spec, &data);
        let baseline: Vec<u8> = data
            .chunks(512)
            .flat_map(|chunk| algorithm.compute_portable(chunk).to_be_bytes())
            .collect();
        assert_eq!(routed, baseline);
    }
}

// =============================================================================
// INVARIANT C4: Callers' Buffer State Is Untouched
// =============================================================================

/// C4: Cursor positions survive verification unchanged.
#[test]
fn test_c4_verify_preserves_cursor_positions() {
    let spec = spec(16, ChecksumAlgorithm::Crc32);
    let mut payload = vec![0u8; 8]; // unrelated prefix the cursor skips
    payload.extend_from_slice(&sequential_data(100));

    let sums_vec = calculate_chunked_sums_slice(&spec, &payload[8..]);

    let mut data = Cursor::new(payload);
    data.set_position(8);
    let mut sums = Cursor::new(sums_vec);
    sums.set_position(0);

    verify_chunked_sums(&spec, &data, &sums, &SourceInfo::new("buf", 0)).unwrap();

    assert_eq!(data.position(), 8, "C4 VIOLATION: data cursor moved");
    assert_eq!(sums.position(), 0, "C4 VIOLATION: sums cursor moved");
}

/// C4: Calculation writes only into the output region and does not
/// advance either cursor.
#[test]
fn test_c4_calculate_writes_only_output_region() {
    let spec = spec(4, ChecksumAlgorithm::Crc32c);
    let data = Cursor::new(sequential_data(10));

    let mut out = vec![0xEEu8; 16];
    let mut sums = Cursor::new(&mut out[..]);
    sums.set_position(4);
    calculate_chunked_sums(&spec, &data, &mut sums).unwrap();

    assert_eq!(data.position(), 0);
    assert_eq!(sums.position(), 4);

    let expected = calculate_chunked_sums_slice(&spec, data.get_ref());
    assert_eq!(&out[..4], &[0xEE; 4], "bytes before the stream touched");
    assert_eq!(&out[4..], &expected[..]);
}

/// C4: The cursor and flat conventions verify the same bytes.
#[test]
fn test_c4_conventions_agree() {
    let spec = spec(7, ChecksumAlgorithm::Crc32);
    let bytes = sequential_data(64);
    let sums_vec = calculate_chunked_sums_slice(&spec, &bytes[10..]);

    let mut data = Cursor::new(bytes.clone());
    data.set_position(10);
    verify_chunked_sums(
        &spec,
        &data,
        &Cursor::new(sums_vec.clone()),
        &SourceInfo::unnamed(),
    )
    .unwrap();
    verify_chunked_sums_slice(&spec, &bytes[10..], &sums_vec, &SourceInfo::unnamed()).unwrap();
}

// =============================================================================
// File Helpers
// =============================================================================

/// File sums match in-memory sums and corruption is located by file
/// offset.
#[test]
fn test_file_chunked_sums_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("documents.dat");
    let contents = sequential_data(5000);
    std::fs::write(&path, &contents).unwrap();

    let spec = spec(512, ChecksumAlgorithm::Crc32c);
    let sums = calculate_file_chunked_sums(&path, &spec).unwrap();
    assert_eq!(sums, calculate_chunked_sums_slice(&spec, &contents));
    verify_file_chunked_sums(&path, &sums, &spec).unwrap();

    // Corrupt a byte in the fifth chunk (offsets 2048..2560).
    let mut corrupted = contents;
    corrupted[2100] ^= 0x80;
    std::fs::write(&path, &corrupted).unwrap();

    let err = verify_file_chunked_sums(&path, &sums, &spec).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.position(), Some(2048));
}
