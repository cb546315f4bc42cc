//! Error types for ftlwire
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using FtlError
pub type Result<T> = std::result::Result<T, FtlError>;

/// Unified error type for ftlwire operations
#[derive(Debug, Error)]
pub enum FtlError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("failed to connect to {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dial-side or write-side I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    /// I/O failure while reading the response (timeout, reset)
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// A tag byte did not match the value expected at this position
    #[error("unexpected format 0x{found:02x}, expected {expected}")]
    FormatMismatch { expected: &'static str, found: u8 },

    /// END sentinel where a value was required
    #[error("unexpected end of sequence, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// Connection closed where no terminator was allowed
    #[error("stream truncated while reading {expected}")]
    Truncated { expected: &'static str },

    #[error("invalid UTF-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FtlError {
    /// True for dial and send failures, raised before the response is read
    pub fn is_transport(&self) -> bool {
        matches!(self, FtlError::Connect { .. } | FtlError::Io(_))
    }
}
