//! Prelude module with common imports
//!
//! Re-exports the most commonly used types from the wsink-server crate for
//! ergonomic imports.

// Server types
pub use crate::config::ServerConfig;
pub use crate::connection::{Connection, ConnectionStats};
pub use crate::error::{Result, ServerError};
pub use crate::logging;
pub use crate::manager::{ConnectionManager, ManagerStats};
pub use crate::server::{Bound, Server, ServerBuilder};
pub use crate::sink::{from_fn, BoxedSink, Incoming, LogSink, Sink};

// Re-export core types
pub use wsink_core::prelude::*;
