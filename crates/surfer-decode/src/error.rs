//! Error types for decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding a FreeSurfer file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be opened.
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Bad magic number or malformed content.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A recognized variant that is not implemented.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// MGH header version other than 1.
    #[error("unsupported MGH version {0} (only version 1 is supported)")]
    UnsupportedVersion(i32),

    /// MGH datatype code with no known element type.
    #[error("unknown MGH datatype code {0}")]
    UnknownDatatype(i32),

    /// The stream ended before the requested bytes were read.
    #[error("truncated read at offset {offset}: expected {expected} bytes, got {available}")]
    TruncatedRead {
        offset: u64,
        expected: usize,
        available: usize,
    },

    /// An I/O error other than end-of-stream while reading.
    #[error("read failed at offset {offset}: {source}")]
    Read {
        offset: u64,
        source: std::io::Error,
    },

    /// The image library recognized the file but could not decode it.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
