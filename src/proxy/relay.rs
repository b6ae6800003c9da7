//! Origin → client response relay.
//!
//! A straight chunked copy: whatever the origin sends, status line and
//! headers included, reaches the client unchanged and in order.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("origin read failed after {relayed} bytes: {source}")]
    OriginRead {
        relayed: u64,
        #[source]
        source: std::io::Error,
    },
    #[error("client write failed after {relayed} bytes: {source}")]
    ClientWrite {
        relayed: u64,
        #[source]
        source: std::io::Error,
    },
}

impl RelayError {
    /// Bytes delivered to the client before the failure.
    pub fn relayed(&self) -> u64 {
        match self {
            RelayError::OriginRead { relayed, .. } | RelayError::ClientWrite { relayed, .. } => *relayed,
        }
    }
}

/// Copy `origin` to `client` in chunks of at most `chunk_size` bytes until
/// the origin closes. Returns the number of bytes relayed.
pub async fn relay<R, W>(origin: &mut R, client: &mut W, chunk_size: usize) -> Result<u64, RelayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size];
    let mut relayed = 0u64;

    loop {
        let n = match origin.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(RelayError::OriginRead { relayed, source }),
        };
        if let Err(source) = client.write_all(&buf[..n]).await {
            return Err(RelayError::ClientWrite { relayed, source });
        }
        relayed += n as u64;
    }

    client
        .flush()
        .await
        .map_err(|source| RelayError::ClientWrite { relayed, source })?;
    Ok(relayed)
}
