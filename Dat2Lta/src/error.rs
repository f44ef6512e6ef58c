//! Error types for `dat2lta`

use std::path::PathBuf;

use thiserror::Error;

use crate::formats::dat::Section;

/// The error type for `dat2lta` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error while reading the input file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One of the output files could not be created or persisted.
    #[error("failed to write {path}: {source}")]
    OutputWriteFailure {
        /// The destination that could not be written.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    // ==================== DAT Decoding Errors ====================
    /// The buffer ended in the middle of a primitive read.
    #[error("truncated input in {section} at offset 0x{offset:08X}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// The section being decoded.
        section: Section,
        /// Byte offset of the failed read.
        offset: usize,
        /// Bytes required by the read.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// A declared count, size or index disagrees with the data around it.
    ///
    /// The usual cause is decoding a file with the wrong vertex layout.
    #[error("unexpected layout in {section} at offset 0x{offset:08X}: {what} expected {expected}, found {found}")]
    UnexpectedSectionLayout {
        /// The section being decoded.
        section: Section,
        /// Byte offset where the inconsistency was detected.
        offset: usize,
        /// What was being checked.
        what: &'static str,
        /// The value implied by the rest of the file.
        expected: u64,
        /// The value actually found.
        found: u64,
    },

    // ==================== Configuration Errors ====================
    /// The vertex layout selector is not one of `v1` / `v2`.
    #[error("unsupported vertex layout selector '{0}' (expected v1 or v2)")]
    UnsupportedVersionSelector(String),

    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    // ==================== Texture Errors ====================
    /// A DTX or SPR file is too short to hold the fields we need.
    #[error("invalid texture header in {path}: {message}")]
    InvalidTextureHeader {
        /// The texture file.
        path: PathBuf,
        /// What was missing.
        message: String,
    },

    // ==================== LTA Errors ====================
    /// The LTA text is not a balanced s-expression document.
    #[error("LTA syntax error on line {line}: {message}")]
    LtaSyntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    // ==================== Formatting Errors ====================
    /// Text rendering failed.
    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error came from decoding the DAT buffer itself.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::TruncatedInput { .. } | Error::UnexpectedSectionLayout { .. }
        )
    }
}

/// A specialized Result type for `dat2lta` operations.
pub type Result<T> = std::result::Result<T, Error>;
