//! Error types for `PakScout`

use thiserror::Error;

/// Reasons a buffer could not be recognised as an LSPK package.
///
/// Fatal for opening that one archive; a batch scan records it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The buffer is shorter than the smallest header variant needs.
    #[error("file too small for a PAK header: {len} bytes (need at least {required})")]
    TooSmall {
        /// Length of the buffer that was inspected.
        len: usize,
        /// Minimum length required by the variant being parsed.
        required: usize,
    },

    /// A signature was found but the header fields are inconsistent or truncated.
    #[error("invalid PAK header: {0}")]
    InvalidHeader(String),

    /// Neither the leading nor the trailing LSPK signature is present.
    #[error("unrecognized archive: no LSPK signature at start or end of file")]
    UnrecognizedArchive,
}

/// The error type for `PakScout` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== PAK Archive Errors ====================
    /// Header detection or decoding failed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// An offset/size pair points past the end of the buffer.
    #[error("truncated data: {requested} bytes at offset {offset} (buffer has {available})")]
    TruncatedData {
        /// Requested start offset.
        offset: u64,
        /// Requested length in bytes.
        requested: u64,
        /// Bytes actually available in the buffer.
        available: u64,
    },

    /// Every decompression strategy failed and the input is not plain text.
    #[error("all decompression strategies failed ({input_len} input bytes, expected {expected:?})")]
    DecompressionExhausted {
        /// Length of the data that was handed to the decompressor.
        input_len: usize,
        /// Size hint supplied by the caller, if any.
        expected: Option<usize>,
    },

    /// The requested member is not in the decoded directory.
    #[error("member not found in PAK: {0}")]
    MemberNotFound(String),

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDir(String),

    /// Worker pool could not be created for a batch scan.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    // ==================== Serialization Errors ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDir(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(err.to_string())
    }
}

/// A specialized Result type for `PakScout` operations.
pub type Result<T> = std::result::Result<T, Error>;
