//! Error types for the wsink server
//!
//! Wraps the core protocol errors and adds the operational failure modes of
//! the listener and per-connection plumbing.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server-specific errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Protocol or frame error from the core crate
    #[error("Core error: {0}")]
    Core(#[from] wsink_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bind retries exhausted
    #[error("Failed to bind {addr} after {attempts} attempts: {source}")]
    BindExhausted {
        /// Address that could not be bound
        addr: SocketAddr,
        /// Number of attempts made
        attempts: u32,
        /// Last bind error
        source: io::Error,
    },

    /// Handshake did not complete within the configured timeout
    #[error("Handshake timed out after {timeout:?}")]
    HandshakeTimeout {
        /// Configured handshake timeout
        timeout: std::time::Duration,
    },

    /// Peer closed the connection before the handshake completed
    #[error("Connection closed during handshake")]
    HandshakeEof,
}
