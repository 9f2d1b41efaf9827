//! Unified error handling for dexls
//!
//! This module defines domain-specific error types that provide better
//! context and debugging information than generic `anyhow::Error`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for dexls operations
#[derive(Debug, Error)]
pub enum ListerError {
    /// Target package metadata could not be resolved
    #[error("Package '{package}' not found: {reason}")]
    PackageLookup { package: String, reason: String },

    /// File I/O error
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Container does not start with a known magic number
    #[error("Not a dex container (unrecognized magic)")]
    InvalidMagic,

    /// Container format detected but not enumerable
    #[error("Unsupported container format: {0}")]
    Unsupported(&'static str),

    /// Container shorter than its declared layout
    #[error("Truncated container: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Structural inconsistency inside a dex container
    #[error("Malformed dex: {0}")]
    Malformed(String),

    /// Stored header checksum disagrees with the payload
    #[error("Header checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// Errors from the zip reader on extracted archives and packages
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Archive opened fine but holds no dex payload
    #[error("Archive contains no '{0}' entry")]
    MissingEntry(&'static str),

    /// Class list cache record could not be decoded
    #[error("Malformed class list cache: {0}")]
    CacheFormat(String),
}

/// Result type alias for dexls operations
pub type Result<T> = std::result::Result<T, ListerError>;

impl ListerError {
    /// Check if this error aborts the whole call rather than one source
    pub fn is_fatal(&self) -> bool {
        matches!(self, ListerError::PackageLookup { .. })
    }
}

/// Convert IO errors with path context
impl ListerError {
    pub fn from_io_error(path: impl Into<PathBuf>, error: io::Error) -> Self {
        ListerError::Io {
            path: path.into(),
            source: error,
        }
    }
}
