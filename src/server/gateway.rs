//! Per-connection signaling gateway
//!
//! One gateway loop runs per accepted signaling connection. It classifies
//! each inbound message, drives the offer/answer handshake, and applies
//! control updates to the session's color cell. Whatever way the loop
//! exits (peer close, malformed framing, transport error, negotiation
//! failure), the session is driven to `Closed` and deregistered.

use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::error::Result;
use crate::registry::SessionRegistry;
use crate::relay::peer::{PeerConnection, SessionDescription};
use crate::session::Session;

use super::message::{classify, SignalEvent, SignalMessage};

/// Signaling gateway for one server
#[derive(Debug)]
pub struct Gateway<C: PeerConnection> {
    registry: Arc<SessionRegistry<C>>,
    relay_capacity: usize,
}

impl<C: PeerConnection> Gateway<C> {
    /// Create a gateway backed by the given registry
    pub fn new(registry: Arc<SessionRegistry<C>>, relay_capacity: usize) -> Self {
        Self {
            registry,
            relay_capacity,
        }
    }

    /// Serve one signaling connection until it ends
    ///
    /// Cleanup runs on every exit path: the session is driven to `Closed`
    /// and removed from the registry before this returns.
    pub async fn serve<Rx, Tx>(&self, session: Arc<Session<C>>, rx: Rx, tx: Tx) -> Result<()>
    where
        Rx: Stream<Item = std::result::Result<Message, WsError>> + Unpin + Send,
        Tx: Sink<Message, Error = WsError> + Unpin + Send,
    {
        let result = self.drive(&session, rx, tx).await;

        session.close().await;
        self.registry.remove(session.id()).await;

        if let Err(ref e) = result {
            tracing::debug!(
                session_id = session.id(),
                error = %e,
                "signaling connection ended with error"
            );
        }
        result
    }

    async fn drive<Rx, Tx>(&self, session: &Arc<Session<C>>, mut rx: Rx, mut tx: Tx) -> Result<()>
    where
        Rx: Stream<Item = std::result::Result<Message, WsError>> + Unpin + Send,
        Tx: Sink<Message, Error = WsError> + Unpin + Send,
    {
        let mut closed = session.closed_signal();
        loop {
            let message = tokio::select! {
                _ = closed.wait_for(|closed| *closed) => {
                    tracing::debug!(
                        session_id = session.id(),
                        "session closed elsewhere, ending signaling loop"
                    );
                    return Ok(());
                }
                message = rx.next() => message,
            };

            let Some(message) = message else {
                break;
            };
            match message? {
                Message::Text(text) => self.dispatch(session, &text, &mut tx).await?,
                Message::Close(_) => break,
                // Binary, ping, and pong carry no signaling meaning
                _ => {}
            }
        }
        Ok(())
    }

    async fn dispatch<Tx>(&self, session: &Arc<Session<C>>, text: &str, tx: &mut Tx) -> Result<()>
    where
        Tx: Sink<Message, Error = WsError> + Unpin + Send,
    {
        match classify(text) {
            SignalEvent::Offer(sdp) => self.handle_offer(session, sdp, tx).await,
            SignalEvent::Control(values) => {
                session.color().set(&values);
                Ok(())
            }
            SignalEvent::Ignored => {
                tracing::trace!(session_id = session.id(), "unrecognized message ignored");
                Ok(())
            }
        }
    }

    /// Drive the offer/answer handshake
    ///
    /// Sends exactly one answer per session; a repeated offer is ignored
    /// since renegotiation is not supported.
    async fn handle_offer<Tx>(
        &self,
        session: &Arc<Session<C>>,
        sdp: String,
        tx: &mut Tx,
    ) -> Result<()>
    where
        Tx: Sink<Message, Error = WsError> + Unpin + Send,
    {
        if !session.start_negotiation() {
            tracing::warn!(
                session_id = session.id(),
                phase = ?session.phase(),
                "offer ignored, negotiation already ran"
            );
            return Ok(());
        }

        self.registry.add(Arc::clone(session)).await;

        session
            .peer()
            .apply_offer(&SessionDescription::offer(sdp))
            .await?;
        let answer = session.peer().create_answer().await?;

        let reply = SignalMessage::Answer { sdp: answer.sdp };
        tx.send(Message::Text(serde_json::to_string(&reply)?)).await?;

        session.mark_connected();
        session.arm_pipeline(self.relay_capacity).await;

        tracing::info!(session_id = session.id(), "session connected");
        Ok(())
    }
}
