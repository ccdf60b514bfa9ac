//! wsink Server
//!
//! Receive-only WebSocket ingest server. Accepts upgrade requests, answers
//! the handshake, then decodes the client's frame stream and hands every
//! unmasked payload to a [`Sink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wsink_server::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> wsink_server::Result<()> {
//!     logging::init();
//!
//!     Server::builder()
//!         .bind("127.0.0.1:8080")?
//!         .build()?
//!         .serve()
//!         .await
//! }
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

// Public modules
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod manager;
pub mod server;
pub mod sink;

// Prelude module with common imports
pub mod prelude;

// Re-export key types for convenience
pub use config::ServerConfig;
pub use connection::{Connection, ConnectionStats};
pub use error::{Result, ServerError};
pub use manager::{ConnectionManager, ManagerStats};
pub use server::{Bound, Server, ServerBuilder};
pub use sink::{from_fn, BoxedSink, Incoming, LogSink, Sink};
