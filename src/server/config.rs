//! Server configuration

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::overlay::MarkerStyle;

/// Default buffer depth for the relay fan-out channel
pub const DEFAULT_RELAY_CAPACITY: usize = 16;

/// Server configuration options
///
/// Shared by the streaming relay and the snapshot server; loaded once at
/// startup, from a JSON file or built in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Request path the signaling WebSocket is served on
    pub signaling_path: String,

    /// Maximum inbound WebSocket message size in bytes
    pub max_message_size: usize,

    /// Buffer depth for the relay fan-out channel
    pub relay_capacity: usize,

    /// Marker rectangle proportions
    pub marker: MarkerStyle,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().unwrap(),
            signaling_path: "/ws".to_string(),
            max_message_size: 4 * 1024 * 1024, // 4MB
            relay_capacity: DEFAULT_RELAY_CAPACITY,
            marker: MarkerStyle::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the signaling path
    pub fn signaling_path(mut self, path: impl Into<String>) -> Self {
        self.signaling_path = path.into();
        self
    }

    /// Set the maximum inbound message size
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the marker rectangle proportions
    pub fn marker(mut self, style: MarkerStyle) -> Self {
        self.marker = style;
        self
    }
}
