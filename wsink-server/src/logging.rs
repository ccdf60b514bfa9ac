//! Logging setup
//!
//! Structured logging via `tracing`, filtered by `RUST_LOG` (default
//! `info`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging subsystem. Safe to call once per process.
pub fn init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Like [`init`], but does nothing if a subscriber is already set. Used by
/// tests that share a process.
pub fn try_init() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
