//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, one task per connection)
//!     → connection.rs (ownership, peer info, line reading)
//!     → Hand off to proxy worker
//!
//! Outgoing
//!     → upstream.rs (fresh origin connection per transaction)
//! ```
//!
//! # Design Decisions
//! - No connection limit and no pooling
//! - Streams move into the task that uses them; nothing is shared

pub mod connection;
pub mod listener;
pub mod upstream;

pub use connection::{ClientConnection, ConnectionId, Line};
pub use listener::{Listener, ListenerError};
pub use upstream::UpstreamError;
