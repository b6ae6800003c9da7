//! Client connection ownership and line reading.
//!
//! # Responsibilities
//! - Identify each connection for log correlation
//! - Record best-effort peer information
//! - Read bounded request/header lines from the client
//! - Expose the write side for error pages and relayed bytes

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};
use tokio::net::TcpStream;
use uuid::Uuid;

/// Unique identifier for a connection.
///
/// Random rather than counted so that workers share no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0.simple())
    }
}

/// Result of reading one line from the client.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// A line, including its terminator if one arrived before EOF.
    Data(Vec<u8>),
    /// The line hit the length limit before a newline.
    TooLong,
    /// The peer closed before sending anything.
    Eof,
}

/// The client side of one transaction.
///
/// Owns the stream for its whole lifetime; dropping it closes the socket.
#[derive(Debug)]
pub struct ClientConnection<S = TcpStream> {
    id: ConnectionId,
    peer_addr: SocketAddr,
    stream: BufReader<S>,
    max_line_bytes: usize,
}

impl<S> ClientConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer_addr: SocketAddr, max_line_bytes: usize) -> Self {
        Self {
            id: ConnectionId::new(),
            peer_addr,
            stream: BufReader::new(stream),
            max_line_bytes,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Peer host for logs. Numeric; no reverse lookup is attempted.
    pub fn peer_host(&self) -> String {
        self.peer_addr.ip().to_string()
    }

    /// Peer service (port) for logs.
    pub fn peer_service(&self) -> String {
        self.peer_addr.port().to_string()
    }

    /// Read one `\n`-terminated line of at most `max_line_bytes`.
    pub async fn read_line(&mut self) -> std::io::Result<Line> {
        let mut buf = Vec::new();
        let limit = self.max_line_bytes as u64;
        let n = (&mut self.stream).take(limit).read_until(b'\n', &mut buf).await?;

        if n == 0 {
            return Ok(Line::Eof);
        }
        if !buf.ends_with(b"\n") && n as u64 == limit {
            return Ok(Line::TooLong);
        }
        Ok(Line::Data(buf))
    }
}

impl<S> AsyncWrite for ClientConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}
