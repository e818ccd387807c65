//! Error types for the BinSect codec.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for codec operations.
///
/// Validation mismatches (structural or byte-diff findings) are not errors:
/// they are carried in reports so a run can surface every finding at once.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid container: bad magic (expected {expected:#010x}, got {actual:#010x})")]
    InvalidMagic { expected: u32, actual: u32 },

    /// Unsupported container version
    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u32),

    /// File is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data structure in file
    #[error("Invalid container structure: {0}")]
    InvalidStructure(String),

    /// Unresolved cross-reference or invalid option set, detected before
    /// any payload bytes are produced
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad input data discovered while encoding a section
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Internal invariant violation in the section writer. Always a defect.
    #[error("Alignment violation in section {id:#06x}: offset {offset} not aligned to {alignment}")]
    Alignment { id: u32, offset: u32, alignment: u32 },

    /// Container has been finalized and cannot be modified
    #[error("Container is finalized and cannot be modified")]
    Finalized,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Create a configuration error from a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an encoding error from a message.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
