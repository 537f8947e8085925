//! Crate-level error types

use crate::overlay::CodecError;
use crate::relay::NegotiationError;

/// Error type for server and session operations
#[derive(Debug)]
pub enum Error {
    /// Socket-level I/O failure
    Io(std::io::Error),
    /// WebSocket transport or protocol failure
    WebSocket(tokio_tungstenite::tungstenite::Error),
    /// JSON (de)serialization failure
    Json(serde_json::Error),
    /// Offer/answer negotiation failure, fatal to the session
    Negotiation(NegotiationError),
    /// Image decode/encode failure
    Codec(CodecError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Negotiation(e) => write!(f, "negotiation failed: {}", e),
            Error::Codec(e) => write!(f, "codec error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::WebSocket(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Negotiation(e) => Some(e),
            Error::Codec(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<NegotiationError> for Error {
    fn from(e: NegotiationError) -> Self {
        Error::Negotiation(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;
