//! Negotiated peer transport seam
//!
//! The peer-to-peer media path is an external capability: something that
//! takes an exchanged offer/answer pair and produces media tracks. This
//! module defines only the interface the session layer drives. The trait
//! methods return `Send` futures so session tasks stay spawnable.

use std::future::Future;

use serde::{Deserialize, Serialize};

use super::track::{MediaTrack, TrackSink};

/// Which side of the offer/answer exchange a description belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// A session description exchanged during negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    /// Create an offer description
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    /// Create an answer description
    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Offer/answer negotiation failure
///
/// Always fatal to the owning session; there is no retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// The remote description could not be applied
    InvalidOffer(String),
    /// The local side rejected the negotiation
    Rejected(String),
    /// The transport went away mid-negotiation
    TransportClosed,
}

impl std::fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationError::InvalidOffer(reason) => write!(f, "invalid offer: {}", reason),
            NegotiationError::Rejected(reason) => write!(f, "negotiation rejected: {}", reason),
            NegotiationError::TransportClosed => write!(f, "transport closed during negotiation"),
        }
    }
}

impl std::error::Error for NegotiationError {}

/// A negotiated peer media transport
///
/// Each session owns exactly one connection handle; handles are never
/// shared across sessions.
pub trait PeerConnection: Send + Sync + 'static {
    /// Apply the peer's offer description
    fn apply_offer(
        &self,
        offer: &SessionDescription,
    ) -> impl Future<Output = Result<(), NegotiationError>> + Send;

    /// Create the local answer description and apply it locally
    fn create_answer(
        &self,
    ) -> impl Future<Output = Result<SessionDescription, NegotiationError>> + Send;

    /// Wait for the peer's inbound media track
    ///
    /// Resolves at most once per connection; `None` means the transport
    /// closed before any media arrived.
    fn incoming_track(&self) -> impl Future<Output = Option<MediaTrack>> + Send;

    /// Outbound path carrying transformed frames back to the peer
    fn return_path(&self) -> TrackSink;

    /// Release transport resources
    ///
    /// Must be idempotent; closing a closed connection is a no-op.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Factory producing one [`PeerConnection`] per session
pub trait PeerConnector: Send + Sync + 'static {
    type Conn: PeerConnection;

    /// Create the transport handle for a new session
    fn connect(&self) -> impl Future<Output = Result<Self::Conn, NegotiationError>> + Send;
}
