//! Forwarding proxy core.
//!
//! # Data Flow
//! ```text
//! accepted ClientConnection
//!     → worker.rs (request line → headers → outbound request)
//!     → net::upstream (fresh origin connection)
//!     → relay.rs (origin bytes → client, unchanged)
//!     → both sockets closed
//! ```

pub mod relay;
pub mod worker;

pub use relay::{relay, RelayError};
pub use worker::handle_connection;
