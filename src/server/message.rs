//! Signaling message shapes and classification
//!
//! Signaling travels as JSON text over the duplex connection. Two shapes
//! are meaningful: the offer (received) and the answer (sent). Any other
//! text message is tried as a control payload, a bare JSON array of
//! integers updating the marker color. Everything else is ignored
//! without terminating the connection.

use serde::{Deserialize, Serialize};

/// Offer/answer signaling message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    Offer { sdp: String },
    Answer { sdp: String },
}

/// Classified inbound signaling message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEvent {
    /// An offer carrying the remote session description
    Offer(String),
    /// A raw control payload; validated downstream by the color cell
    Control(Vec<i64>),
    /// Anything else; dropped without effect
    Ignored,
}

/// Classify one inbound text message
pub fn classify(text: &str) -> SignalEvent {
    if let Ok(message) = serde_json::from_str::<SignalMessage>(text) {
        return match message {
            SignalMessage::Offer { sdp } => SignalEvent::Offer(sdp),
            // We send answers, we don't act on receiving one
            SignalMessage::Answer { .. } => SignalEvent::Ignored,
        };
    }

    if let Ok(values) = serde_json::from_str::<Vec<i64>>(text) {
        return SignalEvent::Control(values);
    }

    SignalEvent::Ignored
}
