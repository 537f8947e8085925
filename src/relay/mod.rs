//! Media path: tracks, fan-out, and the negotiated transport seam
//!
//! This module provides:
//! - Channel-backed media track endpoints
//! - Fan-out from one inbound track to derived subscriber tracks
//! - The peer connection/connector traits the session layer drives
//! - A loopback transport for tests and demos

pub mod loopback;
pub mod peer;
pub mod subscription;
pub mod track;

pub use loopback::{LoopbackConnection, LoopbackConnector, LoopbackRemote};
pub use peer::{NegotiationError, PeerConnection, PeerConnector, SdpKind, SessionDescription};
pub use subscription::{RelayTrack, TrackRelay};
pub use track::{track, MediaTrack, TrackClosed, TrackSink};
