//! Checksum algorithms for chunked integrity data
//!
//! Per INTEGRITY.md §3:
//! - CRC-32 (IEEE polynomial, wire id 1) and CRC-32C (Castagnoli, wire id 2)
//! - Stored checksums are 4 bytes wide for both algorithms
//! - Every kernel must match the standard table-driven definition byte
//!   for byte, so stored checksums verify identically across engine
//!   versions and execution paths

use crc::{Crc, CRC_32_ISCSI, CRC_32_ISO_HDLC};

use super::accel;
use super::errors::{ChecksumError, ChecksumResult};

/// Width of one stored checksum in bytes, for both algorithms.
pub const SUM_WIDTH: usize = 4;

/// Portable CRC-32 baseline.
const CRC32_PORTABLE: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);
/// Portable CRC-32C baseline.
const CRC32C_PORTABLE: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Supported checksum algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    /// CRC-32, IEEE 802.3 polynomial
    Crc32,
    /// CRC-32C, Castagnoli polynomial
    Crc32c,
}

impl ChecksumAlgorithm {
    /// Resolves a wire id to an algorithm.
    ///
    /// # Errors
    ///
    /// Returns `CHUNKSUM_UNSUPPORTED_ALGORITHM` for any id other than
    /// 1 (CRC-32) or 2 (CRC-32C).
    pub fn from_id(id: u32) -> ChecksumResult<Self> {
        match id {
            1 => Ok(ChecksumAlgorithm::Crc32),
            2 => Ok(ChecksumAlgorithm::Crc32c),
            other => Err(ChecksumError::unsupported_algorithm(other)),
        }
    }

    /// Returns the wire id for this algorithm.
    pub fn id(self) -> u32 {
        match self {
            ChecksumAlgorithm::Crc32 => 1,
            ChecksumAlgorithm::Crc32c => 2,
        }
    }

    /// Returns the algorithm name used in formatted checksums.
    pub fn name(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Crc32 => "crc32",
            ChecksumAlgorithm::Crc32c => "crc32c",
        }
    }

    /// Computes the checksum of `data`.
    ///
    /// This function is deterministic: the same input always produces
    /// the same output, on either execution path.
    pub fn compute(self, data: &[u8]) -> u32 {
        if accel::is_acceleration_available() {
            self.compute_accelerated(data)
        } else {
            self.compute_portable(data)
        }
    }

    /// Computes the checksum with the portable kernels.
    ///
    /// This is the correctness baseline and the only path guaranteed
    /// available on every architecture.
    pub fn compute_portable(self, data: &[u8]) -> u32 {
        match self {
            ChecksumAlgorithm::Crc32 => CRC32_PORTABLE.checksum(data),
            ChecksumAlgorithm::Crc32c => CRC32C_PORTABLE.checksum(data),
        }
    }

    /// Computes the checksum with the accelerated kernels.
    ///
    /// Must agree bit for bit with [`Self::compute_portable`] on every
    /// input.
    pub fn compute_accelerated(self, data: &[u8]) -> u32 {
        match self {
            ChecksumAlgorithm::Crc32 => {
                let mut hasher = crc32fast::Hasher::new();
                hasher.update(data);
                hasher.finalize()
            }
            ChecksumAlgorithm::Crc32c => {
                crc_fast::checksum(crc_fast::CrcAlgorithm::Crc32Iscsi, data) as u32
            }
        }
    }
}

/// Formats a checksum as a labeled string.
///
/// Format: `<algorithm>:XXXXXXXX` (lowercase hex, 8 characters,
/// zero-padded), e.g. `crc32:deadbeef` or `crc32c:00000001`.
pub fn format_checksum(algorithm: ChecksumAlgorithm, value: u32) -> String {
    format!("{}:{:08x}", algorithm.name(), value)
}

/// Parses a formatted checksum string back to an algorithm and value.
///
/// Returns `None` if the label or the hex value is invalid.
pub fn parse_checksum(formatted: &str) -> Option<(ChecksumAlgorithm, u32)> {
    let (label, hex) = formatted.split_once(':')?;
    let algorithm = match label {
        "crc32" => ChecksumAlgorithm::Crc32,
        "crc32c" => ChecksumAlgorithm::Crc32c,
        _ => return None,
    };
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some((algorithm, value))
}
