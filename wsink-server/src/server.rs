//! WebSocket ingest server
//!
//! Binds a TCP listener (retrying while the address is in use), accepts
//! connections, and drives each one through its handshake and frame-decode
//! loop on its own task. Connections share nothing but the diagnostic
//! counters.

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::{Result, ServerError};
use crate::manager::{ConnectionManager, ManagerStats};
use crate::sink::{BoxedSink, LogSink, Sink};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;
use wsink_core::error::{ConfigError, Error};

/// WebSocket ingest server
pub struct Server {
    config: ServerConfig,
    sink: BoxedSink,
    manager: Arc<ConnectionManager>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("sink", &"<sink>")
            .field("manager", &self.manager)
            .finish()
    }
}

impl Server {
    /// Create a new server with the given config and sink
    pub fn new(config: ServerConfig, sink: BoxedSink) -> Self {
        Self {
            config,
            sink,
            manager: Arc::new(ConnectionManager::new()),
        }
    }

    /// Create a server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Bind the listener, retrying while the address is in use.
    pub async fn bind(self) -> Result<Bound> {
        let listener = bind_with_retry(
            self.config.bind_address,
            self.config.bind_retry_attempts,
            self.config.bind_retry_delay,
        )
        .await?;
        let local_addr = listener.local_addr()?;

        Ok(Bound {
            listener,
            local_addr,
            config: self.config,
            sink: self.sink,
            manager: self.manager,
        })
    }

    /// Bind and serve until ctrl-c
    pub async fn serve(self) -> Result<()> {
        self.bind().await?.serve().await
    }
}

/// Bind with the retry-on-busy-address loop: on `AddrInUse`, wait and try
/// again; any other error propagates immediately.
async fn bind_with_retry(
    addr: SocketAddr,
    attempts: u32,
    delay: std::time::Duration,
) -> Result<TcpListener> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                if attempt >= attempts {
                    return Err(ServerError::BindExhausted {
                        addr,
                        attempts,
                        source: e,
                    });
                }
                tracing::warn!(%addr, attempt, "address in use, retrying");
                sleep(delay).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// A server with a bound listener
pub struct Bound {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
    sink: BoxedSink,
    manager: Arc<ConnectionManager>,
}

impl std::fmt::Debug for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bound")
            .field("local_addr", &self.local_addr)
            .field("config", &self.config)
            .field("sink", &"<sink>")
            .field("manager", &self.manager)
            .finish()
    }
}

impl Bound {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Connection accounting snapshot
    pub fn stats(&self) -> ManagerStats {
        self.manager.stats()
    }

    /// Accept connections until ctrl-c.
    ///
    /// Each connection runs on its own task; its errors are logged, never
    /// fatal to the accept loop.
    pub async fn serve(self) -> Result<()> {
        tracing::info!(addr = %self.local_addr, "server listening");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => self.accept(stream, remote_addr),
                        Err(e) => {
                            tracing::error!(error = %e, "accept error");
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received");
                    return Ok(());
                }
            }
        }
    }

    fn accept(&self, stream: TcpStream, remote_addr: SocketAddr) {
        if self.manager.active() >= self.config.max_connections {
            tracing::warn!(%remote_addr, "connection limit reached, rejecting");
            drop(stream);
            return;
        }

        let id = self.manager.register();
        tracing::debug!(%remote_addr, connection = id, "accepted connection");

        let config = self.config.clone();
        let sink = self.sink.clone();
        let manager = self.manager.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, remote_addr, id, &config, sink).await {
                tracing::error!(
                    %remote_addr,
                    connection = id,
                    error = %e,
                    "connection terminated"
                );
            }
            manager.deregister();
        });
    }
}

/// Handshake, then decode until EOF.
async fn handle_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    id: u64,
    config: &ServerConfig,
    sink: BoxedSink,
) -> Result<()> {
    let mut connection = Connection::new(stream, remote_addr, id, config);
    connection.upgrade().await?;
    connection.run(sink.as_ref()).await
}

/// Server builder
#[derive(Debug, Clone)]
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Bind to the given address
    pub fn bind<A: std::net::ToSocketAddrs>(mut self, addr: A) -> Result<Self> {
        self.config.bind_address = addr.to_socket_addrs()?.next().ok_or_else(|| {
            ServerError::Core(Error::Config(ConfigError::Validation(
                "Invalid bind address".to_string(),
            )))
        })?;
        Ok(self)
    }

    /// Set maximum concurrent connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    /// Set maximum frame payload size
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set handshake timeout
    pub fn handshake_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Set the bind retry policy
    pub fn bind_retry(mut self, attempts: u32, delay: std::time::Duration) -> Self {
        self.config.bind_retry_attempts = attempts;
        self.config.bind_retry_delay = delay;
        self
    }

    /// Build the server with the default logging sink
    pub fn build(self) -> Result<Server> {
        self.build_with_sink(LogSink::new())
    }

    /// Build the server with a custom sink
    pub fn build_with_sink<S>(self, sink: S) -> Result<Server>
    where
        S: Sink,
    {
        self.config.validate().map_err(ServerError::Core)?;
        Ok(Server::new(self.config, Box::new(sink)))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
