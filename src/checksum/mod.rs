//! Chunked data-integrity checksum subsystem
//!
//! Splits a contiguous region of bytes into fixed-size chunks and keeps
//! one 4-byte checksum per chunk, so the storage and replication layers
//! can locate corruption without re-reading whole files.
//!
//! # Design Principles
//!
//! - One shared chunk scan, two addressing conventions (cursor regions
//!   and flat slices)
//! - Accelerated or portable kernels selected once per process; results
//!   are identical on both paths
//! - Verification stops at the first bad chunk and reports its absolute
//!   byte offset
//!
//! # Invariants Enforced
//!
//! - C1: Every chunk is checksummed
//! - C2: Corruption is never ignored
//! - C3: Execution paths are equivalent
//! - C4: Callers' buffer state is untouched

mod accel;
mod algorithm;
mod chunked;
mod errors;
mod file;

pub use accel::is_acceleration_available;
pub use algorithm::{format_checksum, parse_checksum, ChecksumAlgorithm, SUM_WIDTH};
pub use chunked::{
    calculate_chunked_sums, calculate_chunked_sums_slice, verify_chunked_sums,
    verify_chunked_sums_slice, ChunkSpec, SourceInfo,
};
pub use errors::{ChecksumError, ChecksumErrorCode, ChecksumResult, Severity};
pub use file::{calculate_file_chunked_sums, verify_file_chunked_sums};
