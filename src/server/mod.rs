//! Server surfaces
//!
//! Two independent front doors share the overlay primitives:
//! - [`RelayServer`]: the streaming mode. WebSocket signaling, offer/answer
//!   negotiation, and a continuously transformed media path per session
//! - [`SnapshotServer`]: the discrete mode. One image per binary message,
//!   no persistent session state

pub mod config;
pub mod gateway;
pub mod listener;
pub mod message;
pub mod snapshot;

pub use config::ServerConfig;
pub use gateway::Gateway;
pub use listener::RelayServer;
pub use message::{classify, SignalEvent, SignalMessage};
pub use snapshot::SnapshotServer;
