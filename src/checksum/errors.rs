//! Checksum error types following INTEGRITY.md §6
//!
//! Error codes:
//! - CHUNKSUM_UNSUPPORTED_ALGORITHM (ERROR severity)
//! - CHUNKSUM_INVALID_CHUNK_SPEC (ERROR severity)
//! - CHUNKSUM_MALFORMED_SUMS (ERROR severity)
//! - CHUNKSUM_IO_ERROR (ERROR severity)
//! - CHUNKSUM_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for checksum errors as defined in INTEGRITY.md
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The call fails, the caller decides
    Error,
    /// Data is corrupt relative to its stored checksums
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Checksum-specific error codes as defined in INTEGRITY.md §6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumErrorCode {
    /// Algorithm id is not CRC-32 (1) or CRC-32C (2)
    ChunksumUnsupportedAlgorithm,
    /// Chunk size is not positive
    ChunksumInvalidChunkSpec,
    /// Checksum stream length does not match the data region
    ChunksumMalformedSums,
    /// File could not be read
    ChunksumIoError,
    /// A chunk does not match its stored checksum
    ChunksumDataCorruption,
}

impl ChecksumErrorCode {
    /// Returns the string code as defined in INTEGRITY.md §6
    pub fn code(&self) -> &'static str {
        match self {
            ChecksumErrorCode::ChunksumUnsupportedAlgorithm => "CHUNKSUM_UNSUPPORTED_ALGORITHM",
            ChecksumErrorCode::ChunksumInvalidChunkSpec => "CHUNKSUM_INVALID_CHUNK_SPEC",
            ChecksumErrorCode::ChunksumMalformedSums => "CHUNKSUM_MALFORMED_SUMS",
            ChecksumErrorCode::ChunksumIoError => "CHUNKSUM_IO_ERROR",
            ChecksumErrorCode::ChunksumDataCorruption => "CHUNKSUM_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ChecksumErrorCode::ChunksumUnsupportedAlgorithm => Severity::Error,
            ChecksumErrorCode::ChunksumInvalidChunkSpec => Severity::Error,
            ChecksumErrorCode::ChunksumMalformedSums => Severity::Error,
            ChecksumErrorCode::ChunksumIoError => Severity::Error,
            ChecksumErrorCode::ChunksumDataCorruption => Severity::Fatal,
        }
    }

    /// Returns the invariant violated by this error, if applicable
    pub fn invariant(&self) -> Option<&'static str> {
        match self {
            ChecksumErrorCode::ChunksumUnsupportedAlgorithm => None,
            ChecksumErrorCode::ChunksumInvalidChunkSpec => None,
            ChecksumErrorCode::ChunksumMalformedSums => Some("C1"),
            ChecksumErrorCode::ChunksumIoError => None,
            ChecksumErrorCode::ChunksumDataCorruption => Some("C2"),
        }
    }
}

impl fmt::Display for ChecksumErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Checksum error type with full context as required by INTEGRITY.md
#[derive(Debug)]
pub struct ChecksumError {
    /// Error code
    code: ChecksumErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Source label of corrupt data, if applicable
    source_name: Option<String>,
    /// Absolute byte offset of the first corrupt chunk, if applicable
    position: Option<u64>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl ChecksumError {
    /// Create an unsupported algorithm error
    pub fn unsupported_algorithm(id: u32) -> Self {
        Self {
            code: ChecksumErrorCode::ChunksumUnsupportedAlgorithm,
            message: format!("Unsupported checksum algorithm id: {}", id),
            details: None,
            source_name: None,
            position: None,
            source: None,
        }
    }

    /// Create an invalid chunk spec error
    pub fn invalid_chunk_spec(bytes_per_sum: usize) -> Self {
        Self {
            code: ChecksumErrorCode::ChunksumInvalidChunkSpec,
            message: format!("bytes_per_sum must be positive, got {}", bytes_per_sum),
            details: None,
            source_name: None,
            position: None,
            source: None,
        }
    }

    /// Create a malformed checksum stream error
    pub fn malformed_sums(expected: usize, actual: usize) -> Self {
        Self {
            code: ChecksumErrorCode::ChunksumMalformedSums,
            message: "Checksum stream length does not match data region".to_string(),
            details: Some(format!("expected: {} bytes, actual: {}", expected, actual)),
            source_name: None,
            position: None,
            source: None,
        }
    }

    /// Create a new IO error with context
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ChecksumErrorCode::ChunksumIoError,
            message: message.into(),
            details: None,
            source_name: None,
            position: None,
            source: Some(source),
        }
    }

    /// Create a data corruption error for a mismatching chunk (FATAL).
    ///
    /// `position` is the absolute byte offset of the start of the chunk
    /// within the larger entity the data came from.
    pub fn mismatch(source_name: &str, position: u64, computed: u32, stored: u32) -> Self {
        Self {
            code: ChecksumErrorCode::ChunksumDataCorruption,
            message: format!(
                "Checksum mismatch: computed {:08x}, stored {:08x}",
                computed, stored
            ),
            details: Some(format!(
                "source: {}, byte_offset: {}",
                source_name, position
            )),
            source_name: Some(source_name.to_string()),
            position: Some(position),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ChecksumErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the invariant violated, if applicable
    pub fn invariant(&self) -> Option<&'static str> {
        self.code.invariant()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns the source label of the corrupt data, if applicable
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Returns the absolute byte offset of the first corrupt chunk.
    ///
    /// Callers use this to re-fetch exactly the damaged range, for
    /// example from a replica.
    pub fn position(&self) -> Option<u64> {
        self.position
    }

    /// Returns whether this error reports data corruption (FATAL)
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref invariant) = self.code.invariant() {
            write!(f, " [violates {}]", invariant)?;
        }
        Ok(())
    }
}

impl std::error::Error for ChecksumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for checksum operations
pub type ChecksumResult<T> = Result<T, ChecksumError>;
