//! Decoded-message sinks
//!
//! The decoder hands every unmasked payload to a [`Sink`]. The default sink
//! logs each message, matching the diagnostic sink of the reference system;
//! custom sinks dispatch the payloads elsewhere.

use crate::error::Result;
use bytes::Bytes;
use std::borrow::Cow;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

/// One decoded message surfaced to the collaborator.
///
/// The payload is already unmasked. UTF-8 validity is not enforced by the
/// decoder, so the text view is lossy: corrupt input shows up as replacement
/// characters rather than an error.
#[derive(Debug, Clone)]
pub struct Incoming {
    /// Remote address of the sending connection
    pub remote_addr: SocketAddr,
    /// Server-assigned connection id
    pub connection_id: u64,
    /// Unmasked payload bytes
    pub payload: Bytes,
}

impl Incoming {
    /// Payload interpreted as UTF-8 text
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Trait for receiving decoded messages
pub trait Sink: Send + Sync + 'static {
    /// Deliver one decoded message
    fn deliver<'a>(
        &'a self,
        message: Incoming,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Clone the sink
    fn clone_box(&self) -> Box<dyn Sink>;
}

impl Clone for Box<dyn Sink> {
    fn clone(&self) -> Box<dyn Sink> {
        self.clone_box()
    }
}

/// Boxed sink type
pub type BoxedSink = Box<dyn Sink>;

/// Default sink: log every decoded message at `info`
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl LogSink {
    /// Create a new logging sink
    pub fn new() -> Self {
        Self
    }
}

impl Sink for LogSink {
    fn deliver<'a>(
        &'a self,
        message: Incoming,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(
                remote = %message.remote_addr,
                connection = message.connection_id,
                len = message.payload.len(),
                "message: {}",
                message.text()
            );
            Ok(())
        })
    }

    fn clone_box(&self) -> Box<dyn Sink> {
        Box::new(self.clone())
    }
}

/// Function-based sink
#[derive(Clone)]
pub struct FnSink<F> {
    f: F,
}

impl<F> Sink for FnSink<F>
where
    F: Fn(Incoming) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>
        + Send
        + Sync
        + Clone
        + 'static,
{
    fn deliver<'a>(
        &'a self,
        message: Incoming,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        (self.f)(message)
    }

    fn clone_box(&self) -> Box<dyn Sink> {
        Box::new(self.clone())
    }
}

impl<F> std::fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSink").field("f", &"<function>").finish()
    }
}

/// Create a sink from an async closure
pub fn from_fn<F, Fut>(
    f: F,
) -> FnSink<
    impl Fn(Incoming) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>
        + Send
        + Sync
        + Clone
        + 'static,
>
where
    F: Fn(Incoming) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnSink {
        f: move |message| {
            Box::pin(f(message)) as Pin<Box<dyn Future<Output = Result<()>> + Send>>
        },
    }
}
