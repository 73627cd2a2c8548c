//! Chunked checksums over whole files
//!
//! Per INTEGRITY.md §5:
//! - Mismatch positions are absolute file offsets
//! - A checksum stream of the wrong length is rejected before any
//!   chunk is read
//!
//! Files are read through a buffered reader one chunk at a time. Short
//! reads are refilled to a full chunk so chunk boundaries stay stable
//! regardless of how the reads land.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::chunked::ChunkSpec;
use super::errors::{ChecksumError, ChecksumResult};

/// Calculates the chunked checksum stream of an entire file.
///
/// # Errors
///
/// Returns `CHUNKSUM_IO_ERROR` if the file cannot be read.
pub fn calculate_file_chunked_sums(path: &Path, spec: &ChunkSpec) -> ChecksumResult<Vec<u8>> {
    let file = open(path)?;
    let mut reader = BufReader::new(file);
    let mut chunk = vec![0u8; spec.bytes_per_sum()];
    let mut sums = Vec::new();

    loop {
        let filled = read_chunk(&mut reader, &mut chunk)
            .map_err(|e| ChecksumError::io_error(read_context(path), e))?;
        if filled == 0 {
            break;
        }
        let sum = spec.algorithm().compute(&chunk[..filled]);
        sums.extend_from_slice(&sum.to_be_bytes());
        if filled < chunk.len() {
            break;
        }
    }

    Ok(sums)
}

/// Verifies an entire file against its checksum stream.
///
/// The stream length is checked against the file size before any data
/// is read; mismatches are reported at the absolute file offset of the
/// bad chunk, with the file path as the source label.
///
/// # Errors
///
/// - `CHUNKSUM_IO_ERROR` if the file cannot be read
/// - `CHUNKSUM_MALFORMED_SUMS` if `sums` does not cover the file
/// - `CHUNKSUM_DATA_CORRUPTION` at the first mismatching chunk
pub fn verify_file_chunked_sums(path: &Path, sums: &[u8], spec: &ChunkSpec) -> ChecksumResult<()> {
    use super::algorithm::SUM_WIDTH;

    let file = open(path)?;
    let file_len = file
        .metadata()
        .map_err(|e| ChecksumError::io_error(read_context(path), e))?
        .len() as usize;

    let expected = spec.sums_len(file_len);
    if sums.len() != expected {
        return Err(ChecksumError::malformed_sums(expected, sums.len()));
    }

    let source_name = path.display().to_string();
    let mut reader = BufReader::new(file);
    let mut chunk = vec![0u8; spec.bytes_per_sum()];

    for index in 0..spec.chunk_count(file_len) {
        let filled = read_chunk(&mut reader, &mut chunk)
            .map_err(|e| ChecksumError::io_error(read_context(path), e))?;
        let at = index * SUM_WIDTH;
        let stored = u32::from_be_bytes([sums[at], sums[at + 1], sums[at + 2], sums[at + 3]]);
        let computed = spec.algorithm().compute(&chunk[..filled]);
        if computed != stored {
            let position = (index * spec.bytes_per_sum()) as u64;
            return Err(ChecksumError::mismatch(
                &source_name,
                position,
                computed,
                stored,
            ));
        }
    }

    Ok(())
}

fn open(path: &Path) -> ChecksumResult<File> {
    File::open(path)
        .map_err(|e| ChecksumError::io_error(format!("Failed to open {}", path.display()), e))
}

fn read_context(path: &Path) -> String {
    format!("Failed to read {}", path.display())
}

/// Reads until `buf` is full or the reader is exhausted. Returns the
/// number of bytes filled.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
