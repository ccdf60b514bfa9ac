//! # wsink Core
//!
//! Protocol logic for the wsink receive-only WebSocket server:
//!
//! - Handshake verification: derive the `Sec-WebSocket-Accept` value from a
//!   client key and produce the literal `101 Switching Protocols` response
//! - Incremental frame decoding: buffer raw byte chunks, extract complete
//!   frames as they become available, and unmask their payloads
//! - Protocol constants and error types
//!
//! This crate performs no I/O. The server crate feeds it bytes and writes
//! back whatever it produces.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

// Core modules
pub mod error;
pub mod frame;
pub mod handshake;
pub mod protocol;

// Prelude module with common imports
pub mod prelude;

// Re-export key types for convenience
pub use error::{Error, Result};
pub use frame::FrameDecoder;
pub use handshake::UpgradeRequest;
