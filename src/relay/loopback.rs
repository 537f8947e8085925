//! In-process peer transport
//!
//! A loopback implementation of the transport seam for tests and demos:
//! the "remote peer" is the other half of a channel pair in the same
//! process. The remote half decides when media starts and observes the
//! transformed frames coming back over the return path.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, Mutex};

use crate::overlay::RasterFrame;

use super::peer::{NegotiationError, PeerConnection, PeerConnector, SdpKind, SessionDescription};
use super::track::{track, MediaTrack, TrackSink};

const LOOPBACK_ANSWER: &str = "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\ns=loopback\r\n";

/// Default buffer depth for loopback tracks
pub const LOOPBACK_TRACK_CAPACITY: usize = 16;

/// Connector producing loopback connections
///
/// The remote half of every connection it creates is delivered on the
/// receiver returned by [`LoopbackConnector::channel`].
#[derive(Debug)]
pub struct LoopbackConnector {
    remotes: mpsc::UnboundedSender<LoopbackRemote>,
}

impl LoopbackConnector {
    /// Create a connector and the stream of remote halves
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LoopbackRemote>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { remotes: tx }, rx)
    }
}

impl PeerConnector for LoopbackConnector {
    type Conn = LoopbackConnection;

    async fn connect(&self) -> Result<LoopbackConnection, NegotiationError> {
        let (conn, remote) = LoopbackConnection::pair();
        self.remotes
            .send(remote)
            .map_err(|_| NegotiationError::TransportClosed)?;
        Ok(conn)
    }
}

/// Local half of a loopback transport
#[derive(Debug)]
pub struct LoopbackConnection {
    closed: AtomicBool,
    incoming: Mutex<mpsc::Receiver<MediaTrack>>,
    outbound: TrackSink,
}

impl LoopbackConnection {
    /// Create a connected local/remote pair
    pub fn pair() -> (Self, LoopbackRemote) {
        let (outbound, transformed) = track(LOOPBACK_TRACK_CAPACITY);
        let (media_tx, media_rx) = mpsc::channel(1);

        let conn = Self {
            closed: AtomicBool::new(false),
            incoming: Mutex::new(media_rx),
            outbound,
        };
        let remote = LoopbackRemote {
            media: media_tx,
            transformed,
        };
        (conn, remote)
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

impl PeerConnection for LoopbackConnection {
    async fn apply_offer(&self, offer: &SessionDescription) -> Result<(), NegotiationError> {
        if self.is_closed() {
            return Err(NegotiationError::TransportClosed);
        }
        if offer.kind != SdpKind::Offer {
            return Err(NegotiationError::InvalidOffer("not an offer".into()));
        }
        if offer.sdp.is_empty() {
            return Err(NegotiationError::InvalidOffer("empty description".into()));
        }
        Ok(())
    }

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError> {
        if self.is_closed() {
            return Err(NegotiationError::TransportClosed);
        }
        Ok(SessionDescription::answer(LOOPBACK_ANSWER))
    }

    async fn incoming_track(&self) -> Option<MediaTrack> {
        self.incoming.lock().await.recv().await
    }

    fn return_path(&self) -> TrackSink {
        self.outbound.clone()
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::Relaxed) {
            return;
        }
        self.incoming.lock().await.close();
        tracing::debug!("loopback connection closed");
    }
}

/// Remote half of a loopback transport
#[derive(Debug)]
pub struct LoopbackRemote {
    media: mpsc::Sender<MediaTrack>,
    transformed: MediaTrack,
}

impl LoopbackRemote {
    /// Start sending media: delivers the inbound track to the local half
    ///
    /// Returns the sink the "remote camera" writes raw frames into.
    pub async fn start_media(&self) -> TrackSink {
        let (sink, inbound) = track(LOOPBACK_TRACK_CAPACITY);
        if self.media.send(inbound).await.is_err() {
            tracing::debug!("local half gone before media started");
        }
        sink
    }

    /// Receive the next transformed frame from the return path
    pub async fn recv_transformed(&mut self) -> Option<RasterFrame> {
        self.transformed.recv().await
    }
}
