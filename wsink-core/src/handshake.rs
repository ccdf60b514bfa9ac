//! WebSocket handshake verification
//!
//! Given an upgrade request, derive the `Sec-WebSocket-Accept` value from
//! the client key (RFC 6455 §4.2.2) and produce the literal response block
//! that completes the protocol switch. The response is written exactly once
//! per connection, before any frame is parsed.

use crate::error::{ProtocolError, Result};
use crate::protocol::constants::*;
use base64::{engine::general_purpose, Engine as _};
use sha1::{Digest, Sha1};

/// A parsed upgrade request, reduced to the fields this server consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRequest {
    /// Request path
    pub path: String,
    /// Client-supplied Sec-WebSocket-Key value
    pub key: String,
}

impl UpgradeRequest {
    /// Parse a buffered request head.
    ///
    /// `head` must contain the complete head including the terminating blank
    /// line; a partial head yields [`ProtocolError::IncompleteRequest`] so
    /// the caller can read more bytes and retry.
    pub fn parse(head: &[u8]) -> Result<Self> {
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut req = httparse::Request::new(&mut headers);

        let status = req
            .parse(head)
            .map_err(|e| ProtocolError::BadRequest(e.to_string()))?;
        if status.is_partial() {
            return Err(ProtocolError::IncompleteRequest.into());
        }

        let path = req.path.unwrap_or("/").to_string();

        let upgrade = req
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(HEADER_UPGRADE))
            .map(|h| String::from_utf8_lossy(h.value).to_lowercase());
        if upgrade.as_deref() != Some(UPGRADE_WEBSOCKET) {
            return Err(ProtocolError::NotAnUpgrade.into());
        }

        let key = req
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(HEADER_SEC_WEBSOCKET_KEY))
            .map(|h| String::from_utf8_lossy(h.value).trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ProtocolError::MissingKey)?;

        Ok(Self { path, key })
    }

    /// Produce the response block completing this request's upgrade.
    pub fn response(&self) -> String {
        response_block(&self.key)
    }
}

/// Compute the accept value for a client key.
///
/// Pure: SHA-1 over the key concatenated with the protocol GUID, base64 of
/// the 20-byte digest.
pub fn accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}

/// Build the literal `101 Switching Protocols` response block for a client
/// key, terminated by an empty line.
pub fn response_block(key: &str) -> String {
    [
        "HTTP/1.1 101 Switching Protocols".to_string(),
        "Upgrade: websocket".to_string(),
        "Connection: Upgrade".to_string(),
        format!("{}: {}", HEADER_SEC_WEBSOCKET_ACCEPT, accept_key(key)),
        "\r\n".to_string(),
    ]
    .join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    // RFC 6455 §1.3 reference vector
    const SAMPLE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";
    const SAMPLE_ACCEPT: &str = "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=";

    #[test]
    fn test_accept_key_reference_vector() {
        assert_eq!(accept_key(SAMPLE_KEY), SAMPLE_ACCEPT);
    }

    #[test]
    fn test_accept_key_deterministic() {
        assert_eq!(accept_key("abc"), accept_key("abc"));
        assert_ne!(accept_key("abc"), accept_key("abd"));
    }

    #[test]
    fn test_response_block_layout() {
        let block = response_block(SAMPLE_KEY);
        assert!(block.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
        assert!(block.contains("Upgrade: websocket\r\n"));
        assert!(block.contains("Connection: Upgrade\r\n"));
        assert!(block.contains(&format!("Sec-WebSocket-Accept: {}\r\n", SAMPLE_ACCEPT)));
        assert!(block.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_parse_upgrade_request() {
        let head = b"GET /chat HTTP/1.1\r\n\
            Host: example.com\r\n\
            Upgrade: websocket\r\n\
            Connection: Upgrade\r\n\
            Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
            Sec-WebSocket-Version: 13\r\n\r\n";

        let request = UpgradeRequest::parse(head).unwrap();
        assert_eq!(request.path, "/chat");
        assert_eq!(request.key, SAMPLE_KEY);
        assert!(request.response().contains(SAMPLE_ACCEPT));
    }

    #[test]
    fn test_parse_missing_key() {
        let head = b"GET / HTTP/1.1\r\n\
            Upgrade: websocket\r\n\
            Connection: Upgrade\r\n\r\n";

        let err = UpgradeRequest::parse(head).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::MissingKey)
        ));
    }

    #[test]
    fn test_parse_not_an_upgrade() {
        let head = b"GET /health HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let err = UpgradeRequest::parse(head).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::NotAnUpgrade)
        ));
    }

    #[test]
    fn test_parse_partial_head() {
        let head = b"GET / HTTP/1.1\r\nUpgrade: websoc";
        let err = UpgradeRequest::parse(head).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::IncompleteRequest)
        ));
    }
}
