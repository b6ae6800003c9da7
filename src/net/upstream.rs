//! Origin server connections.
//!
//! One fresh TCP connection per transaction. Resolution failures, refused
//! connections and bad ports all surface as the same [`UpstreamError`]; the
//! client sees a single error class for any of them.

use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
#[error("could not connect to {host}:{port}: {source}")]
pub struct UpstreamError {
    pub host: String,
    pub port: String,
    #[source]
    pub source: std::io::Error,
}

/// Open a TCP connection to `host:port`, resolving `host` if needed.
///
/// `host` may be an IPv6 literal in brackets, as it appears in a URI.
pub async fn connect(host: &str, port: &str) -> Result<TcpStream, UpstreamError> {
    let fail = |source: std::io::Error| UpstreamError {
        host: host.to_string(),
        port: port.to_string(),
        source,
    };

    let port_num: u16 = port.parse().map_err(|_| {
        fail(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "invalid port",
        ))
    })?;
    let bare_host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    let stream = TcpStream::connect((bare_host, port_num)).await.map_err(fail)?;

    tracing::debug!(
        host = %host,
        port = %port,
        origin_addr = ?stream.peer_addr().ok(),
        "Connected to origin"
    );
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_listening_origin() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port().to_string();

        let stream = connect("127.0.0.1", &port).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap(), listener.local_addr().unwrap());
    }

    #[tokio::test]
    async fn refused_connection_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port().to_string();
        drop(listener);

        let err = connect("127.0.0.1", &port).await.unwrap_err();
        assert_eq!(err.host, "127.0.0.1");
        assert_eq!(err.port, port);
    }

    #[tokio::test]
    async fn invalid_port_is_error() {
        let err = connect("127.0.0.1", "http").await.unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::InvalidInput);

        assert!(connect("127.0.0.1", "70000").await.is_err());
    }

    #[tokio::test]
    async fn unresolvable_host_is_error() {
        assert!(connect("host.invalid", "80").await.is_err());
    }
}
