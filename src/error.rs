//! # Error Types
//!
//! Custom error types for the Iliad downlink using `thiserror`.
//!
//! Checksum failures are deliberately absent: a corrupted frame is a decode
//! outcome handled by the resynchronizer, never an error surfaced to callers.

use thiserror::Error;

/// Main error type for the Iliad downlink
#[derive(Debug, Error)]
pub enum DownlinkError {
    /// The transport could not be acquired
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Caller supplied values that do not match the selected packet types
    #[error("Encode error: {0}")]
    Encode(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the Iliad downlink
pub type Result<T> = std::result::Result<T, DownlinkError>;
