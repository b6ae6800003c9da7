//! Concurrent HTTP/1.0 forwarding proxy.
//!
//! Accepts client connections, rewrites each `GET` request for the origin
//! named in its absolute-form target, and relays the origin's response back
//! byte-for-byte. One task per connection; tasks share nothing but the
//! read-only configuration.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod proxy;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use error::TransactionError;
pub use lifecycle::Shutdown;
pub use net::Listener;
