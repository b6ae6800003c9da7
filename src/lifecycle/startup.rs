//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command-line overrides
//! - Validate before anything else starts
//! - Bind the listener and run the accept loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - All process-wide setup happens here, before the first accept

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{load_config, ConfigError, ProxyConfig};
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Values supplied on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: u16,
    pub bind_host: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// Produce the validated configuration for this run.
pub fn prepare_config(overrides: &Overrides) -> Result<ProxyConfig, ConfigError> {
    load_config(overrides.config_path.as_deref(), |config| {
        config.listener.port = overrides.port;
        if let Some(host) = &overrides.bind_host {
            config.listener.bind_host = host.clone();
        }
    })
}

/// Bind the listener and serve until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        chunk_size = config.relay.chunk_size,
        max_line_bytes = config.limits.max_line_bytes,
        max_request_bytes = config.limits.max_request_bytes,
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;
    listener.serve(Arc::new(config), shutdown.subscribe()).await;

    tracing::info!("Proxy stopped");
    Ok(())
}
