//! Process-wide session bookkeeping
//!
//! The registry holds every session that has entered negotiation and is
//! the single place shutdown goes to tear the process down cleanly.

pub mod store;

pub use store::SessionRegistry;
