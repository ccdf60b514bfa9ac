//! WebSocket protocol constants
//!
//! The subset of RFC 6455 this server consumes: the handshake constants and
//! the frame header layout of a client-to-server data frame.

/// Handshake constants
pub mod constants {
    /// Magic GUID appended to the client key before hashing (RFC 6455 §4.2.2)
    pub const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

    /// Sec-WebSocket-Key header name
    pub const HEADER_SEC_WEBSOCKET_KEY: &str = "sec-websocket-key";

    /// Sec-WebSocket-Accept header name
    pub const HEADER_SEC_WEBSOCKET_ACCEPT: &str = "Sec-WebSocket-Accept";

    /// Upgrade header name
    pub const HEADER_UPGRADE: &str = "upgrade";

    /// Connection header name
    pub const HEADER_CONNECTION: &str = "connection";

    /// Upgrade header value requesting a websocket connection
    pub const UPGRADE_WEBSOCKET: &str = "websocket";

    /// Maximum size of a buffered upgrade-request head
    pub const MAX_REQUEST_HEAD_SIZE: usize = 8192; // 8KB

    /// Default maximum frame size accepted by the decoder
    pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024; // 16MB
}

/// Frame header bit positions and field widths
pub mod frame {
    /// MASK bit in byte 1
    pub const MASK_BIT: u8 = 0x80;

    /// 7-bit length-class mask in byte 1
    pub const PAYLOAD_LEN_MASK: u8 = 0x7F;

    /// Length class selecting a 16-bit extended length
    pub const PAYLOAD_LEN_16: u8 = 126;

    /// Length class selecting a 64-bit extended length
    pub const PAYLOAD_LEN_64: u8 = 127;

    /// Header size when the length is inline
    pub const HEADER_SIZE_INLINE: usize = 2;

    /// Header size with a 16-bit extended length
    pub const HEADER_SIZE_16: usize = 4;

    /// Header size with a 64-bit extended length
    pub const HEADER_SIZE_64: usize = 10;

    /// Masking key length
    pub const MASKING_KEY_LEN: usize = 4;
}
