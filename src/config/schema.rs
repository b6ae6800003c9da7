//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// `User-Agent` sent to every origin unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:3.10.0) Gecko/20230411 Firefox/63.0.";

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Per-transaction buffer limits.
    pub limits: LimitsConfig,

    /// Response relay settings.
    pub relay: RelayConfig,

    /// Outbound request settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or address to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Listening port. Usually supplied on the command line.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` string handed to the socket layer.
    pub fn bind_address(&self) -> String {
        if self.bind_host.contains(':') && !self.bind_host.starts_with('[') {
            format!("[{}]:{}", self.bind_host, self.port)
        } else {
            format!("{}:{}", self.bind_host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Limits applied while reading and rendering a request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Longest request or header line accepted from a client, including CRLF.
    pub max_line_bytes: usize,

    /// Largest outbound request the translator may render.
    pub max_request_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: 8192,
            max_request_bytes: 8192,
        }
    }
}

/// Response relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Upper bound for a single origin read (maximum object size).
    pub chunk_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100 * 1024,
        }
    }
}

/// Outbound request configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Port used when the request target names none.
    pub default_port: String,

    /// Value of the injected `User-Agent` header.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            default_port: "80".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Output format of the fmt layer.
    pub log_format: LogFormat,

    /// Emit ANSI colors.
    pub ansi: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "tiny_proxy=info".to_string(),
            log_format: LogFormat::Full,
            ansi: true,
        }
    }
}
