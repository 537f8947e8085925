//! Inbound track fan-out
//!
//! One decoded inbound stream can feed any number of local consumers
//! without duplicate decoding. Subscribers are armed first, then the relay
//! is consumed by [`TrackRelay::pump`], which forwards the inbound track
//! into the fan-out channel until the track ends. When the pump finishes,
//! every subscriber observes end of stream after draining.
//!
//! A subscriber that falls behind skips ahead to the newest frames instead
//! of stalling the pump.

use tokio::sync::broadcast;

use crate::overlay::RasterFrame;

use super::track::MediaTrack;

/// Fan-out point for one inbound media track
#[derive(Debug)]
pub struct TrackRelay {
    tx: broadcast::Sender<RasterFrame>,
}

impl TrackRelay {
    /// Create a relay with the given fan-out buffer depth
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Derive a new subscriber track
    ///
    /// Subscribers only see frames pumped after they are armed.
    pub fn subscribe(&self) -> RelayTrack {
        RelayTrack {
            rx: self.tx.subscribe(),
        }
    }

    /// Forward the inbound track into the fan-out channel until it ends
    ///
    /// Consumes the relay; no further subscribers can be armed once the
    /// pump is running.
    pub async fn pump(self, mut track: MediaTrack) {
        while let Some(frame) = track.recv().await {
            // No subscribers is fine; the frame is simply dropped
            let _ = self.tx.send(frame);
        }
        tracing::debug!("inbound track ended, relay pump stopping");
    }
}

/// A derived track fed by a [`TrackRelay`]
#[derive(Debug)]
pub struct RelayTrack {
    rx: broadcast::Receiver<RasterFrame>,
}

impl RelayTrack {
    /// Receive the next frame
    ///
    /// Returns `None` once the pump has finished and the buffer is drained.
    /// Skips over frames lost to lag.
    pub async fn recv(&mut self) -> Option<RasterFrame> {
        loop {
            match self.rx.recv().await {
                Ok(frame) => return Some(frame),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "relay subscriber lagged, skipping ahead");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
