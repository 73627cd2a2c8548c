//! Chunked checksum calculation and verification
//!
//! Per INTEGRITY.md §2 and §5:
//! - Data is split into `bytes_per_sum`-sized chunks; the final chunk
//!   may be short
//! - One 4-byte big-endian checksum per chunk, in chunk order
//! - Verification walks chunks left to right and stops at the first
//!   mismatch, reporting the absolute byte offset of the bad chunk
//! - Neither operation moves a caller's cursor
//!
//! The chunk scan is implemented once over plain byte slices; the
//! cursor-addressed entry points are thin adapters over it.

use std::io::Cursor;

use super::algorithm::{ChecksumAlgorithm, SUM_WIDTH};
use super::errors::{ChecksumError, ChecksumResult};

/// Chunking parameters: nominal chunk size plus checksum algorithm.
///
/// Validated at construction, so every engine operation observes a
/// positive chunk size and a supported algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    bytes_per_sum: usize,
    algorithm: ChecksumAlgorithm,
}

impl ChunkSpec {
    /// Default chunk size used by the storage layer.
    pub const DEFAULT_BYTES_PER_SUM: usize = 512;

    /// Creates a chunk spec.
    ///
    /// # Errors
    ///
    /// Returns `CHUNKSUM_INVALID_CHUNK_SPEC` if `bytes_per_sum` is zero.
    pub fn new(bytes_per_sum: usize, algorithm: ChecksumAlgorithm) -> ChecksumResult<Self> {
        if bytes_per_sum == 0 {
            return Err(ChecksumError::invalid_chunk_spec(bytes_per_sum));
        }
        Ok(Self {
            bytes_per_sum,
            algorithm,
        })
    }

    /// Creates a chunk spec from a raw algorithm wire id.
    ///
    /// # Errors
    ///
    /// Returns `CHUNKSUM_UNSUPPORTED_ALGORITHM` for an unknown id and
    /// `CHUNKSUM_INVALID_CHUNK_SPEC` if `bytes_per_sum` is zero.
    pub fn from_id(bytes_per_sum: usize, algorithm_id: u32) -> ChecksumResult<Self> {
        Self::new(bytes_per_sum, ChecksumAlgorithm::from_id(algorithm_id)?)
    }

    /// Returns the nominal chunk size in bytes.
    pub fn bytes_per_sum(&self) -> usize {
        self.bytes_per_sum
    }

    /// Returns the checksum algorithm.
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Returns the number of chunks covering `data_len` bytes.
    pub fn chunk_count(&self, data_len: usize) -> usize {
        (data_len + self.bytes_per_sum - 1) / self.bytes_per_sum
    }

    /// Returns the checksum stream length for `data_len` bytes of data.
    pub fn sums_len(&self, data_len: usize) -> usize {
        self.chunk_count(data_len) * SUM_WIDTH
    }
}

/// Where the data came from, carried through for corruption reports
/// only; never interpreted.
#[derive(Debug, Clone, Copy)]
pub struct SourceInfo<'a> {
    name: &'a str,
    base_position: u64,
}

impl<'a> SourceInfo<'a> {
    /// Creates source info for error reporting.
    ///
    /// `base_position` is the absolute offset of the start of the data
    /// region within the larger entity (e.g. a file) it came from.
    pub fn new(name: &'a str, base_position: u64) -> Self {
        Self {
            name,
            base_position,
        }
    }

    /// Source info for data with no meaningful origin, e.g. freshly
    /// calculated sums.
    pub fn unnamed() -> SourceInfo<'static> {
        SourceInfo {
            name: "",
            base_position: 0,
        }
    }

    /// Returns the source label.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the absolute offset of the data region's start.
    pub fn base_position(&self) -> u64 {
        self.base_position
    }
}

/// Verifies a data slice against its stored checksum stream.
///
/// Chunks are checked in order; the scan stops at the first mismatch.
///
/// # Errors
///
/// - `CHUNKSUM_MALFORMED_SUMS` if `sums` is not exactly one 4-byte
///   value per chunk of `data`
/// - `CHUNKSUM_DATA_CORRUPTION` naming the source and the absolute byte
///   offset of the first mismatching chunk
pub fn verify_chunked_sums_slice(
    spec: &ChunkSpec,
    data: &[u8],
    sums: &[u8],
    source: &SourceInfo<'_>,
) -> ChecksumResult<()> {
    let expected = spec.sums_len(data.len());
    if sums.len() != expected {
        return Err(ChecksumError::malformed_sums(expected, sums.len()));
    }

    for (index, chunk) in data.chunks(spec.bytes_per_sum()).enumerate() {
        let at = index * SUM_WIDTH;
        let stored = u32::from_be_bytes([sums[at], sums[at + 1], sums[at + 2], sums[at + 3]]);
        let computed = spec.algorithm().compute(chunk);
        if computed != stored {
            let position = source.base_position() + (index * spec.bytes_per_sum()) as u64;
            return Err(ChecksumError::mismatch(
                source.name(),
                position,
                computed,
                stored,
            ));
        }
    }

    Ok(())
}

/// Verifies cursor-addressed regions.
///
/// Operates on each cursor's window from its current position to the
/// end of its buffer. Cursor positions are not modified.
///
/// # Errors
///
/// Same as [`verify_chunked_sums_slice`].
pub fn verify_chunked_sums<D, S>(
    spec: &ChunkSpec,
    data: &Cursor<D>,
    sums: &Cursor<S>,
    source: &SourceInfo<'_>,
) -> ChecksumResult<()>
where
    D: AsRef<[u8]>,
    S: AsRef<[u8]>,
{
    verify_chunked_sums_slice(spec, remaining(data), remaining(sums), source)
}

/// Calculates the checksum stream for a data slice.
///
/// Returns one 4-byte big-endian checksum per chunk, in chunk order;
/// empty data yields an empty stream. Never fails: data content cannot
/// be invalid, and the spec was validated at construction.
pub fn calculate_chunked_sums_slice(spec: &ChunkSpec, data: &[u8]) -> Vec<u8> {
    let mut sums = Vec::with_capacity(spec.sums_len(data.len()));
    for chunk in data.chunks(spec.bytes_per_sum()) {
        sums.extend_from_slice(&spec.algorithm().compute(chunk).to_be_bytes());
    }
    sums
}

/// Calculates the checksum stream for a cursor-addressed data region
/// into a caller-provided output region.
///
/// Reads from the data cursor's current position to the end of its
/// buffer and writes the stream starting at the output cursor's current
/// position. Neither cursor is advanced.
///
/// # Errors
///
/// Returns `CHUNKSUM_MALFORMED_SUMS` if the output region is too small
/// for the stream.
pub fn calculate_chunked_sums<D>(
    spec: &ChunkSpec,
    data: &Cursor<D>,
    sums: &mut Cursor<&mut [u8]>,
) -> ChecksumResult<()>
where
    D: AsRef<[u8]>,
{
    let data_slice = remaining(data);
    let needed = spec.sums_len(data_slice.len());

    let start = (sums.position().min(sums.get_ref().len() as u64)) as usize;
    let out: &mut [u8] = sums.get_mut();
    if out.len() - start < needed {
        return Err(ChecksumError::malformed_sums(needed, out.len() - start));
    }

    for (index, chunk) in data_slice.chunks(spec.bytes_per_sum()).enumerate() {
        let at = start + index * SUM_WIDTH;
        out[at..at + SUM_WIDTH].copy_from_slice(&spec.algorithm().compute(chunk).to_be_bytes());
    }

    Ok(())
}

/// The window from a cursor's current position to the end of its
/// buffer, read through a shared reference.
fn remaining<B: AsRef<[u8]>>(cursor: &Cursor<B>) -> &[u8] {
    let buf = cursor.get_ref().as_ref();
    let position = (cursor.position().min(buf.len() as u64)) as usize;
    &buf[position..]
}
