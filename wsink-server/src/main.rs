//! wsink — receive-only WebSocket ingest server
//!
//! Listens on the fixed default address, answers upgrade handshakes, and
//! logs every decoded text payload. No CLI flags; `RUST_LOG` controls log
//! verbosity.

use wsink_server::{logging, Server};

#[tokio::main]
async fn main() -> wsink_server::Result<()> {
    // Process-level crash logging: panics in spawned tasks end up in the log
    // rather than only on stderr.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {}", info);
    }));

    logging::init();

    Server::builder().build()?.serve().await
}
