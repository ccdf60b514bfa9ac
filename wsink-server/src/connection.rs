//! Per-connection handling
//!
//! One [`Connection`] owns one TCP stream and one frame decoder. The server
//! drives it in two strictly ordered phases: [`Connection::upgrade`] answers
//! the handshake, then [`Connection::run`] feeds every arriving chunk
//! through the decoder and delivers the payloads to the sink. No frame is
//! parsed before the handshake response has been written.

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::sink::{Incoming, Sink};
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use wsink_core::protocol::constants::MAX_REQUEST_HEAD_SIZE;
use wsink_core::{error::ProtocolError, FrameDecoder, UpgradeRequest};

/// Per-connection diagnostic counters
#[derive(Debug, Clone, Copy)]
pub struct ConnectionStats {
    /// Frames decoded on this connection
    pub frames_received: u64,
    /// Raw bytes received after the handshake
    pub bytes_received: u64,
    /// When the connection was accepted
    pub established_at: Instant,
}

/// One accepted WebSocket connection
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    remote_addr: SocketAddr,
    id: u64,
    decoder: FrameDecoder,
    handshake_timeout: Duration,
    /// Bytes that arrived in the same reads as the request head; they belong
    /// to the frame stream and are decoded first once `run` starts
    pending: Vec<u8>,
    stats: ConnectionStats,
}

impl Connection {
    /// Wrap an accepted stream
    pub fn new(stream: TcpStream, remote_addr: SocketAddr, id: u64, config: &ServerConfig) -> Self {
        Self {
            stream,
            remote_addr,
            id,
            decoder: FrameDecoder::with_max_frame_size(config.max_frame_size),
            handshake_timeout: config.handshake_timeout,
            pending: Vec::new(),
            stats: ConnectionStats {
                frames_received: 0,
                bytes_received: 0,
                established_at: Instant::now(),
            },
        }
    }

    /// Remote address of the peer
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Server-assigned connection id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Diagnostic counters
    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }

    /// Read the upgrade request and write the handshake response.
    ///
    /// The response block is written exactly once, before any frame
    /// processing. Returns the parsed request on success.
    pub async fn upgrade(&mut self) -> Result<UpgradeRequest> {
        let head = self.read_request_head().await?;
        let request = UpgradeRequest::parse(&head)?;

        let response = request.response();
        self.stream.write_all(response.as_bytes()).await?;
        self.stream.flush().await?;

        tracing::debug!(
            remote = %self.remote_addr,
            connection = self.id,
            path = %request.path,
            "handshake complete"
        );
        Ok(request)
    }

    /// Read until the blank line terminating the request head.
    ///
    /// Anything received beyond the terminator is retained for the frame
    /// decoder: clients may coalesce the first frames with the request.
    async fn read_request_head(&mut self) -> Result<Vec<u8>> {
        let handshake_timeout = self.handshake_timeout;
        let read = timeout(handshake_timeout, async {
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 1024];

            loop {
                if let Some(end) = find_head_end(&buffer) {
                    self.pending = buffer.split_off(end);
                    return Ok(buffer);
                }

                if buffer.len() > MAX_REQUEST_HEAD_SIZE {
                    return Err(ServerError::Core(
                        ProtocolError::RequestTooLarge {
                            size: buffer.len(),
                            max: MAX_REQUEST_HEAD_SIZE,
                        }
                        .into(),
                    ));
                }

                let n = self.stream.read(&mut chunk).await?;
                if n == 0 {
                    return Err(ServerError::HandshakeEof);
                }
                buffer.extend_from_slice(&chunk[..n]);
            }
        })
        .await;

        match read {
            Ok(result) => result,
            Err(_) => Err(ServerError::HandshakeTimeout {
                timeout: handshake_timeout,
            }),
        }
    }

    /// Decode the frame stream until EOF, delivering every payload in order.
    ///
    /// A declared frame length beyond the configured maximum fails closed:
    /// the error propagates and the caller drops the connection.
    pub async fn run(&mut self, sink: &dyn Sink) -> Result<()> {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.dispatch(&pending, sink).await?;
        }

        let mut chunk = [0u8; 4096];
        loop {
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                tracing::debug!(
                    remote = %self.remote_addr,
                    connection = self.id,
                    frames = self.stats.frames_received,
                    "connection closed by peer"
                );
                return Ok(());
            }
            self.dispatch(&chunk[..n], sink).await?;
        }
    }

    /// Feed one chunk to the decoder and deliver what it produced.
    async fn dispatch(&mut self, data: &[u8], sink: &dyn Sink) -> Result<()> {
        self.stats.bytes_received += data.len() as u64;

        for payload in self.decoder.feed(data)? {
            self.stats.frames_received += 1;
            self.deliver(payload, sink).await?;
        }
        Ok(())
    }

    async fn deliver(&self, payload: Bytes, sink: &dyn Sink) -> Result<()> {
        sink.deliver(Incoming {
            remote_addr: self.remote_addr,
            connection_id: self.id,
            payload,
        })
        .await
    }
}

/// Offset one past the `\r\n\r\n` terminating a request head, if buffered.
fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}
