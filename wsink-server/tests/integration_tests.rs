//! Integration tests for the wsink server
//!
//! Drive a real server over loopback: upgrade handshake, frame delivery in
//! whole, split, and coalesced chunks, and the fail-closed paths.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_test::assert_ok;
use wsink_server::prelude::*;

// RFC 6455 §1.3 reference vector
const SAMPLE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";
const SAMPLE_ACCEPT: &str = "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=";

const MASK: [u8; 4] = [0x37, 0xFA, 0x21, 0x3D];

fn upgrade_request() -> String {
    format!(
        "GET /ingest HTTP/1.1\r\n\
         Host: localhost\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {}\r\n\
         Sec-WebSocket-Version: 13\r\n\r\n",
        SAMPLE_KEY
    )
}

/// Build one masked text frame the way a client would.
fn masked_text_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0x81];
    let len = payload.len();
    if len <= 125 {
        out.push(0x80 | len as u8);
    } else if len <= u16::MAX as usize {
        out.push(0x80 | 126);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(0x80 | 127);
        out.extend_from_slice(&(len as u64).to_be_bytes());
    }
    out.extend_from_slice(&MASK);
    out.extend(payload.iter().enumerate().map(|(i, &b)| b ^ MASK[i % 4]));
    out
}

/// Bind an ephemeral port, serve in the background, and capture every
/// delivered message on a channel.
async fn spawn_server(builder: ServerBuilder) -> (SocketAddr, mpsc::UnboundedReceiver<Incoming>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = from_fn(move |message: Incoming| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(message);
            Ok(())
        }
    });

    let bound = builder
        .bind("127.0.0.1:0")
        .unwrap()
        .build_with_sink(sink)
        .unwrap()
        .bind()
        .await
        .unwrap();
    let addr = bound.local_addr();
    tokio::spawn(bound.serve());
    (addr, rx)
}

/// Complete the handshake and return the response head.
async fn connect_and_upgrade(addr: SocketAddr) -> (TcpStream, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(upgrade_request().as_bytes())
        .await
        .unwrap();

    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut byte).await.unwrap();
        assert_ne!(n, 0, "server closed during handshake");
        head.push(byte[0]);
    }
    (stream, String::from_utf8(head).unwrap())
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<Incoming>) -> Incoming {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("sink channel closed")
}

#[tokio::test]
async fn test_end_to_end_upgrade_and_decode() {
    let (addr, mut rx) = spawn_server(Server::builder()).await;
    let (mut stream, response) = connect_and_upgrade(addr).await;

    assert!(response.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
    assert!(response.contains("Upgrade: websocket\r\n"));
    assert!(response.contains("Connection: Upgrade\r\n"));
    assert!(response.contains(&format!("Sec-WebSocket-Accept: {}\r\n", SAMPLE_ACCEPT)));

    assert_ok!(stream.write_all(&masked_text_frame(b"hi")).await);

    let message = recv(&mut rx).await;
    assert_eq!(&message.payload[..], b"hi");
    assert_eq!(message.text(), "hi");
}

#[tokio::test]
async fn test_split_frame_delivery() {
    let (addr, mut rx) = spawn_server(Server::builder()).await;
    let (mut stream, _) = connect_and_upgrade(addr).await;

    // Header and mask first, payload later.
    let frame = masked_text_frame(b"split");
    assert_ok!(stream.write_all(&frame[..6]).await);
    stream.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_ok!(stream.write_all(&frame[6..]).await);

    let message = recv(&mut rx).await;
    assert_eq!(message.text(), "split");
}

#[tokio::test]
async fn test_frames_coalesced_with_upgrade_request() {
    let (addr, mut rx) = spawn_server(Server::builder()).await;

    // Request head and the first frame in a single write.
    let mut bytes = upgrade_request().into_bytes();
    bytes.extend_from_slice(&masked_text_frame(b"early"));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&bytes).await.unwrap();

    let message = recv(&mut rx).await;
    assert_eq!(message.text(), "early");
}

#[tokio::test]
async fn test_multiple_frames_in_one_write() {
    let (addr, mut rx) = spawn_server(Server::builder()).await;
    let (mut stream, _) = connect_and_upgrade(addr).await;

    let mut bytes = masked_text_frame(b"one");
    bytes.extend_from_slice(&masked_text_frame(b"two"));
    bytes.extend_from_slice(&masked_text_frame(b"three"));
    assert_ok!(stream.write_all(&bytes).await);

    assert_eq!(recv(&mut rx).await.text(), "one");
    assert_eq!(recv(&mut rx).await.text(), "two");
    assert_eq!(recv(&mut rx).await.text(), "three");
}

#[tokio::test]
async fn test_large_extended_length_frame() {
    let (addr, mut rx) = spawn_server(Server::builder()).await;
    let (mut stream, _) = connect_and_upgrade(addr).await;

    let payload = vec![b'x'; 70_000];
    assert_ok!(stream.write_all(&masked_text_frame(&payload)).await);

    let message = recv(&mut rx).await;
    assert_eq!(message.payload.len(), 70_000);
}

#[tokio::test]
async fn test_oversized_frame_drops_connection() {
    let (addr, mut rx) = spawn_server(Server::builder().max_frame_size(64)).await;
    let (mut stream, _) = connect_and_upgrade(addr).await;

    stream
        .write_all(&masked_text_frame(&vec![0u8; 500]))
        .await
        .unwrap();

    // Fail closed: the server resets the connection without decoding.
    let mut buf = [0u8; 16];
    let n = timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("timed out waiting for reset")
        .unwrap_or(0);
    assert_eq!(n, 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_key_closes_without_response() {
    let (addr, _rx) = spawn_server(Server::builder()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\r\n")
        .await
        .unwrap();

    let mut buf = [0u8; 16];
    let n = timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("timed out waiting for close")
        .unwrap_or(0);
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_connection_limit_rejects_excess() {
    let (addr, mut rx) = spawn_server(Server::builder().max_connections(1)).await;

    // First connection occupies the only slot.
    let (_held, _) = connect_and_upgrade(addr).await;

    // Second connection is closed before any handshake.
    let mut rejected = TcpStream::connect(addr).await.unwrap();
    rejected
        .write_all(upgrade_request().as_bytes())
        .await
        .unwrap();
    let mut buf = [0u8; 16];
    let n = timeout(Duration::from_secs(5), rejected.read(&mut buf))
        .await
        .expect("timed out waiting for rejection")
        .unwrap_or(0);
    assert_eq!(n, 0);

    assert!(rx.try_recv().is_err());
}
