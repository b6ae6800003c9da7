//! TCP listener and accept loop.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Accept incoming TCP connections
//! - Hand each connection to its own detached worker task
//! - Keep accepting through per-connection accept errors

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{ListenerConfig, ProxyConfig};
use crate::net::connection::ClientConnection;
use crate::proxy::handle_connection;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// The proxy's listening socket.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let address = config.bind_address();
        let inner = TcpListener::bind(&address)
            .await
            .map_err(|source| ListenerError::Bind {
                address: address.clone(),
                source,
            })?;

        tracing::info!(
            address = ?inner.local_addr().ok(),
            "Listener bound"
        );

        Ok(Self { inner })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Accept connections until `shutdown` fires.
    ///
    /// Each connection moves into a freshly spawned worker that nobody
    /// awaits. Workers still running when the loop ends are left alone.
    pub async fn serve(self, config: Arc<ProxyConfig>, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                accepted = self.inner.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        let client = ClientConnection::new(stream, peer_addr, config.limits.max_line_bytes);
                        tracing::debug!(
                            connection_id = %client.id(),
                            peer_host = %client.peer_host(),
                            peer_service = %client.peer_service(),
                            "Accepted connection"
                        );
                        tokio::spawn(handle_connection(client, Arc::clone(&config)));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Listener stopping");
                    break;
                }
            }
        }
    }
}
