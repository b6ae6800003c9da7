//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tiny_proxy::{Listener, ProxyConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Read from `socket` until the end of a request header block.
async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.ends_with(b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
    received
}

/// Start an origin that answers every request with `response` after
/// `delay`, and reports each request it received on the returned channel.
pub async fn start_origin(response: Vec<u8>, delay: Duration) -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let response = Arc::new(response);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    let response = Arc::clone(&response);
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let _ = tx.send(request);
                        tokio::time::sleep(delay).await;
                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start an origin that answers immediately with a fixed response.
pub async fn start_canned_origin(response: Vec<u8>) -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    start_origin(response, Duration::ZERO).await
}

/// A simple 200 response with `body`.
pub fn ok_response(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}

/// Deterministic response of exactly `len` bytes.
pub fn canned_bytes(len: usize) -> Vec<u8> {
    let head = b"HTTP/1.0 200 OK\r\n\r\n";
    let mut out = head.to_vec();
    out.extend((0..len.saturating_sub(head.len())).map(|i| (i % 253) as u8));
    out.truncate(len);
    out
}

/// Start the proxy on an ephemeral loopback port.
pub async fn start_proxy(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    config.listener.bind_host = "127.0.0.1".to_string();
    config.listener.port = 0;

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    tokio::spawn(listener.serve(Arc::new(config), shutdown.subscribe()));
    (addr, shutdown)
}

/// Send raw request bytes through the proxy and collect the whole reply.
pub async fn send_raw(proxy: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

/// `GET` `path` on `origin` through the proxy with extra header lines.
pub async fn get(proxy: SocketAddr, origin: SocketAddr, path: &str, headers: &[&str]) -> Vec<u8> {
    let mut request = format!("GET http://{origin}{path} HTTP/1.0\r\n");
    for header in headers {
        request.push_str(header);
        request.push_str("\r\n");
    }
    request.push_str("\r\n");
    send_raw(proxy, request.as_bytes()).await
}

/// The first line of a response, without CRLF.
pub fn status_line(response: &[u8]) -> String {
    let end = response
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(response.len());
    String::from_utf8_lossy(&response[..end]).into_owned()
}
