//! Per-client session state and lifecycle
//!
//! A [`Session`] is created for every accepted signaling connection and
//! owns its negotiated peer transport exclusively. Three concurrent
//! activities meet here: the signaling receive loop, the frame pipeline,
//! and per-message control updates. The [`MarkerColorCell`] is their only
//! shared resource.

pub mod color_cell;
pub(crate) mod pipeline;
pub mod state;

pub use color_cell::MarkerColorCell;
pub use state::{PhaseCell, SessionPhase};

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::overlay::MarkerStyle;
use crate::relay::peer::PeerConnection;

/// State for one client connection
///
/// Created when the signaling connection is accepted, destroyed when it
/// closes or negotiation irrecoverably fails.
#[derive(Debug)]
pub struct Session<C: PeerConnection> {
    id: u64,
    peer: C,
    phase: PhaseCell,
    color: MarkerColorCell,
    style: MarkerStyle,
    pipeline: Mutex<Option<JoinHandle<()>>>,
    closed_tx: watch::Sender<bool>,
}

impl<C: PeerConnection> Session<C> {
    /// Create a session owning the given peer transport
    pub fn new(id: u64, peer: C, style: MarkerStyle) -> Self {
        Self {
            id,
            peer,
            phase: PhaseCell::new(),
            color: MarkerColorCell::new(),
            style,
            pipeline: Mutex::new(None),
            closed_tx: watch::channel(false).0,
        }
    }

    /// Unique session ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase.get()
    }

    /// The session's marker color cell
    pub fn color(&self) -> &MarkerColorCell {
        &self.color
    }

    /// The session's marker style
    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    /// The owned peer transport
    pub fn peer(&self) -> &C {
        &self.peer
    }

    /// Watch channel that flips to `true` once the session has closed
    ///
    /// Lets the signaling loop end cooperatively when the session is torn
    /// down from elsewhere, e.g. by shutdown.
    pub fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed_tx.subscribe()
    }

    /// `Idle -> Negotiating`; false if an offer/answer cycle already ran
    pub(crate) fn start_negotiation(&self) -> bool {
        self.phase.start_negotiation()
    }

    /// `Negotiating -> Connected`, after the answer has been sent
    pub(crate) fn mark_connected(&self) -> bool {
        self.phase.connect()
    }

    /// Arm the frame pipeline for a connected session
    pub(crate) async fn arm_pipeline(self: &Arc<Self>, relay_capacity: usize) {
        let handle = pipeline::spawn(Arc::clone(self), relay_capacity);
        *self.pipeline.lock().await = Some(handle);
    }

    /// Drive the session to `Closed`
    ///
    /// Idempotent: only the first caller performs teardown, everyone else
    /// returns immediately. Cancels the frame pipeline at its next
    /// suspension point, then unconditionally releases the peer transport.
    pub async fn close(&self) {
        if !self.phase.begin_close() {
            return;
        }

        if let Some(handle) = self.pipeline.lock().await.take() {
            handle.abort();
        }
        self.peer.close().await;

        self.phase.finish_close();
        let _ = self.closed_tx.send(true);
        tracing::debug!(session_id = self.id, "session closed");
    }
}
