//! Session registry implementation
//!
//! Process-wide set of live sessions, owned by the server lifecycle.
//! Membership changes come from concurrent connection tasks; shutdown
//! drives every remaining session to `Closed` through [`SessionRegistry::close_all`].

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;

use crate::relay::peer::PeerConnection;
use crate::session::Session;

/// Registry of live sessions
///
/// Thread-safe via `RwLock`; a session appears at most once, keyed by its
/// ID.
#[derive(Debug)]
pub struct SessionRegistry<C: PeerConnection> {
    sessions: RwLock<HashMap<u64, Arc<Session<C>>>>,
}

impl<C: PeerConnection> SessionRegistry<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session
    ///
    /// Re-adding the same session ID replaces the entry; membership stays
    /// at most once.
    pub async fn add(&self, session: Arc<Session<C>>) {
        let id = session.id();
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session);

        tracing::debug!(session_id = id, active = sessions.len(), "session registered");
    }

    /// Deregister a session by ID
    ///
    /// Removing an absent session is a no-op, not an error.
    pub async fn remove(&self, id: u64) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(&id).is_some() {
            tracing::debug!(session_id = id, active = sessions.len(), "session deregistered");
        }
    }

    /// Whether a session ID is currently registered
    pub async fn contains(&self, id: u64) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Number of registered sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drive every registered session to `Closed` and wait for completion
    ///
    /// Used once, at process shutdown. Sessions already closing are
    /// tolerated; their close call is a no-op.
    pub async fn close_all(&self) {
        let sessions: Vec<Arc<Session<C>>> = {
            let mut sessions = self.sessions.write().await;
            sessions.drain().map(|(_, session)| session).collect()
        };

        if sessions.is_empty() {
            return;
        }

        tracing::info!(count = sessions.len(), "closing all sessions");
        join_all(sessions.iter().map(|session| session.close())).await;
    }
}

impl<C: PeerConnection> Default for SessionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
