//! Error types for splitzip

use thiserror::Error;

/// Result type for splitzip operations
pub type Result<T> = std::result::Result<T, SplitZipError>;

/// Error types that can occur while building a split ZIP archive.
#[derive(Error, Debug)]
pub enum SplitZipError {
    /// I/O error from the underlying volume files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A size string or compression setting could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Generic volume I/O failure (disk full, permission denied, ...).
    #[error("volume error: {0}")]
    Volume(String),

    /// The configured split size is below the 64 KiB minimum, or an atomic
    /// write is larger than the configured split size.
    #[error("volume too small: {0}")]
    VolumeTooSmall(String),

    /// An arcname attempted path traversal, was absolute, or was otherwise
    /// unsafe to place on disk.
    #[error("unsafe path {path:?}: {reason}")]
    UnsafePath { path: String, reason: &'static str },

    /// The underlying compressor reported an error.
    #[error("compression error: {0}")]
    Compression(String),

    /// A CRC32 or size check against a caller-supplied expectation failed.
    #[error("integrity check failed for {name:?}: {detail}")]
    Integrity { name: String, detail: String },

    /// A ZIP32 structural limit (4 GiB file, 65535 entries, 65535-byte name)
    /// was exceeded.
    #[error("ZIP32 limit exceeded: {0}")]
    Overflow(String),

    /// The archive was already aborted by a previous error and can no
    /// longer accept operations.
    #[error("archive is aborted after a previous error")]
    Aborted,
}
