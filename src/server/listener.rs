//! Relay server listener
//!
//! Handles the TCP accept loop, upgrades each connection to a signaling
//! WebSocket on the configured path, and spawns one gateway task per
//! client. Shutdown drives every registered session to `Closed` before
//! returning.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;

use crate::error::Result;
use crate::registry::SessionRegistry;
use crate::relay::peer::PeerConnector;
use crate::server::config::ServerConfig;
use crate::server::gateway::Gateway;
use crate::session::Session;

/// Streaming-mode relay server
pub struct RelayServer<P: PeerConnector> {
    config: ServerConfig,
    connector: Arc<P>,
    registry: Arc<SessionRegistry<P::Conn>>,
    next_session_id: AtomicU64,
}

impl<P: PeerConnector> RelayServer<P> {
    /// Create a new server with the given configuration and transport
    /// connector
    pub fn new(config: ServerConfig, connector: P) -> Self {
        Self {
            config,
            connector: Arc::new(connector),
            registry: Arc::new(SessionRegistry::new()),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Get a reference to the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry<P::Conn>> {
        &self.registry
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        tracing::info!(
            addr = %listener.local_addr()?,
            path = %self.config.signaling_path,
            "signaling server listening"
        );
        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    ///
    /// When `shutdown` resolves, every registered session is driven to
    /// `Closed` before this returns.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            path = %self.config.signaling_path,
            "signaling server listening"
        );

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        };

        self.registry.close_all().await;
        result
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let config = self.config.clone();
        let connector = Arc::clone(&self.connector);
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            if let Err(e) = serve_socket(socket, peer_addr, session_id, config, connector, registry).await
            {
                tracing::debug!(session_id, error = %e, "connection error");
            }
            tracing::info!(session_id, peer = %peer_addr, "signaling connection closed");
        });
    }
}

async fn serve_socket<P: PeerConnector>(
    socket: TcpStream,
    peer_addr: SocketAddr,
    session_id: u64,
    config: ServerConfig,
    connector: Arc<P>,
    registry: Arc<SessionRegistry<P::Conn>>,
) -> Result<()> {
    let signaling_path = config.signaling_path.clone();
    let check_path = move |request: &Request, response: Response| {
        if request.uri().path() == signaling_path {
            Ok(response)
        } else {
            tracing::warn!(path = %request.uri().path(), "connection rejected: unknown path");
            let mut not_found = ErrorResponse::new(Some("not found".to_string()));
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            Err(not_found)
        }
    };

    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = Some(config.max_message_size);

    let ws =
        tokio_tungstenite::accept_hdr_async_with_config(socket, check_path, Some(ws_config)).await?;
    tracing::info!(session_id, peer = %peer_addr, "signaling connection open");

    let peer = connector.connect().await?;
    let session = Arc::new(Session::new(session_id, peer, config.marker));

    let gateway = Gateway::new(registry, config.relay_capacity);
    let (tx, rx) = ws.split();
    gateway.serve(session, rx, tx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::loopback::LoopbackConnector;
    use crate::server::message::SignalMessage;

    use futures::SinkExt;
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message;

    async fn start_server() -> (
        Arc<RelayServer<LoopbackConnector>>,
        tokio::sync::mpsc::UnboundedReceiver<crate::relay::LoopbackRemote>,
        SocketAddr,
    ) {
        let (connector, remotes) = LoopbackConnector::channel();
        let server = Arc::new(RelayServer::new(ServerConfig::default(), connector));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = Arc::clone(&server);
        tokio::spawn(async move {
            let _ = accept.serve(listener).await;
        });

        (server, remotes, addr)
    }

    #[tokio::test]
    async fn test_end_to_end_signaling() {
        let (server, mut remotes, addr) = start_server().await;

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
            .await
            .unwrap();

        ws.send(Message::Text(r#"{"type": "offer", "sdp": "v=0"}"#.into()))
            .await
            .unwrap();

        let reply = ws.next().await.unwrap().unwrap();
        let Message::Text(body) = reply else {
            panic!("expected text answer");
        };
        let parsed: SignalMessage = serde_json::from_str(&body).unwrap();
        assert!(matches!(parsed, SignalMessage::Answer { .. }));

        // The transport seam saw the connection
        assert!(remotes.recv().await.is_some());
        assert_eq!(server.registry().len().await, 1);

        // Closing the signaling connection tears the session down
        ws.close(None).await.unwrap();
        for _ in 0..200 {
            if server.registry().is_empty().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("session was not deregistered after close");
    }

    #[tokio::test]
    async fn test_unknown_path_rejected() {
        let (_server, _remotes, addr) = start_server().await;

        let result = tokio_tungstenite::connect_async(format!("ws://{}/bogus", addr)).await;

        assert!(result.is_err());
    }
}
