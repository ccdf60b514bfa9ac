//! Error types for wsink
//!
//! One enum per concern. Insufficient frame data is deliberately not an
//! error anywhere in this crate: the decoder reports it by emitting nothing
//! and waiting for more bytes.

#![allow(missing_docs)]

use thiserror::Error;

/// Result type alias for wsink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for wsink operations
#[derive(Error, Debug)]
pub enum Error {
    /// Handshake / upgrade-request errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Frame decoding errors
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upgrade-request and handshake errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The request head could not be parsed as HTTP
    #[error("Malformed upgrade request: {0}")]
    BadRequest(String),

    /// The request head is not yet fully buffered
    #[error("Incomplete upgrade request")]
    IncompleteRequest,

    /// The request does not ask for a websocket upgrade
    #[error("Not a websocket upgrade request")]
    NotAnUpgrade,

    /// The request carries no Sec-WebSocket-Key header
    #[error("Missing Sec-WebSocket-Key header")]
    MissingKey,

    /// The upgrade-request head exceeds the allowed size
    #[error("Upgrade request too large: {size} bytes (max: {max})")]
    RequestTooLarge { size: usize, max: usize },
}

/// Frame decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Declared payload length exceeds the configured maximum
    #[error("Frame too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}
