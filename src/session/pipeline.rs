//! Per-session frame pipeline
//!
//! One task per session: wait for the peer's inbound media track, arm the
//! relay subscription, then continuously transform and forward frames
//! until the track or the return path ends. The task suspends only while
//! waiting for the next inbound frame, so a stalled stream never blocks
//! the session's signaling loop or control handling.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::overlay::transform;
use crate::relay::peer::PeerConnection;
use crate::relay::subscription::TrackRelay;

use super::Session;

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawn the transform-and-forward task for a connected session
pub(crate) fn spawn<C: PeerConnection>(
    session: Arc<Session<C>>,
    relay_capacity: usize,
) -> JoinHandle<()> {
    tokio::spawn(run(session, relay_capacity))
}

async fn run<C: PeerConnection>(session: Arc<Session<C>>, relay_capacity: usize) {
    let session_id = session.id();

    let Some(inbound) = session.peer().incoming_track().await else {
        tracing::debug!(session_id, "transport closed before media arrived");
        return;
    };
    tracing::info!(session_id, "inbound track armed");

    let relay = TrackRelay::new(relay_capacity);
    let mut frames = relay.subscribe();
    let pump = AbortOnDrop(tokio::spawn(relay.pump(inbound)));

    let sink = session.peer().return_path();
    while let Some(frame) = frames.recv().await {
        let transformed = transform(frame, session.color().get(), session.style());
        if sink.send(transformed).await.is_err() {
            tracing::debug!(session_id, "return path closed");
            break;
        }
    }

    drop(pump);
    tracing::debug!(session_id, "frame pipeline finished");
}
