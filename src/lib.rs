//! Real-time video marker overlay relay
//!
//! A client negotiates a peer-to-peer media path over a WebSocket
//! signaling connection, streams video in, and receives the same stream
//! back with a colored marker rectangle overlaid on every frame. The
//! marker color is updated out-of-band by control messages on the
//! signaling connection while the stream is live.
//!
//! # Architecture
//!
//! ```text
//!                 WebSocket (signaling + control)
//!  [Client] ──────────────────────────────────────► [Gateway]
//!      │         offer ──► answer, [r, g, b]            │
//!      │                                          ┌─────┴──────┐
//!      │  negotiated media path                   │  Session   │
//!      └────────────────────────────► inbound ──► │ ColorCell  │
//!                                      track      │  Pipeline  │
//!      ◄──────────────────────────── transformed ◄┤ (per frame │
//!                                      track      │  overlay)  │
//!                                                 └────────────┘
//! ```
//!
//! One task per session runs the signaling loop, a second drives the
//! frame pipeline; the color cell is their only shared state. The
//! process-wide [`SessionRegistry`] tears every live session down at
//! shutdown.
//!
//! The simpler snapshot mode ([`SnapshotServer`]) applies the same
//! overlay to one still image per request, with no session state.
//!
//! # Example
//!
//! ```no_run
//! use marker_rs::{LoopbackConnector, RelayServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> marker_rs::Result<()> {
//!     let (connector, _remotes) = LoopbackConnector::channel();
//!     let config = ServerConfig::default();
//!     let server = RelayServer::new(config, connector);
//!     server.run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await
//! }
//! ```

pub mod error;
pub mod overlay;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;

pub use error::{Error, Result};
pub use overlay::{
    transform, CodecError, ImageCodec, ImageProcessor, MarkerColor, MarkerStyle, PixelFormat,
    RasterFrame, RawCodec,
};
pub use registry::SessionRegistry;
pub use relay::{
    LoopbackConnection, LoopbackConnector, LoopbackRemote, MediaTrack, NegotiationError,
    PeerConnection, PeerConnector, SessionDescription, TrackRelay, TrackSink,
};
pub use server::{Gateway, RelayServer, ServerConfig, SignalMessage, SnapshotServer};
pub use session::{MarkerColorCell, Session, SessionPhase};
