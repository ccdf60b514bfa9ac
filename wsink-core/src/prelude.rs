//! Prelude module for wsink Core
//!
//! Re-exports the commonly used types for ergonomic imports.

pub use crate::error::{ConfigError, Error, FrameError, ProtocolError, Result};
pub use crate::frame::FrameDecoder;
pub use crate::handshake::{accept_key, response_block, UpgradeRequest};

// Re-export commonly used external dependencies
pub use bytes::{Bytes, BytesMut};
