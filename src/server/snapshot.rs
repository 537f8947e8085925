//! Snapshot server (discrete request/response mode)
//!
//! Each binary WebSocket message carries one request: the first 3 bytes
//! are the marker color components, the rest is a compressed image. The
//! reply is the re-encoded image with the marker applied. No session
//! state persists between messages.
//!
//! ```text
//! +------+------+------+----------------------+
//! | R(1) | G(1) | B(1) | compressed image (N) |
//! +------+------+------+----------------------+
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;
use crate::overlay::{ImageCodec, ImageProcessor, MarkerColor};
use crate::server::config::ServerConfig;

/// Discrete-mode overlay server
pub struct SnapshotServer<C: ImageCodec> {
    config: ServerConfig,
    processor: Arc<ImageProcessor<C>>,
}

impl<C: ImageCodec> SnapshotServer<C> {
    /// Create a server using the given codec pair
    pub fn new(config: ServerConfig, codec: C) -> Self {
        let processor = Arc::new(ImageProcessor::with_style(codec, config.marker));
        Self { config, processor }
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
        tracing::info!(addr = %listener.local_addr()?, "snapshot server listening");

        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    let processor = Arc::clone(&self.processor);
                    let max_message_size = self.config.max_message_size;

                    tokio::spawn(async move {
                        if let Err(e) =
                            serve_socket(socket, peer_addr, processor, max_message_size).await
                        {
                            tracing::debug!(peer = %peer_addr, error = %e, "snapshot connection error");
                        }
                        tracing::info!(peer = %peer_addr, "snapshot connection closed");
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}

async fn serve_socket<C: ImageCodec>(
    socket: TcpStream,
    peer_addr: SocketAddr,
    processor: Arc<ImageProcessor<C>>,
    max_message_size: usize,
) -> Result<()> {
    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = Some(max_message_size);

    let ws = tokio_tungstenite::accept_async_with_config(socket, Some(ws_config)).await?;
    tracing::info!(peer = %peer_addr, "snapshot connection open");

    let (mut tx, mut rx) = ws.split();
    while let Some(message) = rx.next().await {
        match message? {
            Message::Binary(data) => {
                if let Some(reply) = handle_request(&processor, &data) {
                    tx.send(Message::Binary(reply.into())).await?;
                }
            }
            Message::Close(_) => break,
            // Text, ping, and pong carry no requests
            _ => {}
        }
    }
    Ok(())
}

/// Process one snapshot request
///
/// Requests shorter than 4 bytes and requests carrying an undecodable
/// image are dropped without a reply; the connection stays open for
/// subsequent messages.
fn handle_request<C: ImageCodec>(processor: &ImageProcessor<C>, data: &[u8]) -> Option<Bytes> {
    if data.len() < 4 {
        tracing::debug!(len = data.len(), "snapshot request too short, dropped");
        return None;
    }

    let color = MarkerColor::new(data[0], data[1], data[2]);
    match processor.process(&data[3..], Some(color)) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            tracing::warn!(error = %e, "undecodable snapshot payload, dropped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{PixelFormat, RasterFrame, RawCodec};

    fn encoded_frame(width: u32, height: u32) -> Vec<u8> {
        let frame = RasterFrame::solid(width, height, PixelFormat::Bgr24, [0, 0, 0], 1);
        RawCodec::new().encode(&frame).unwrap().to_vec()
    }

    fn request(color: [u8; 3], image: &[u8]) -> Vec<u8> {
        let mut data = color.to_vec();
        data.extend_from_slice(image);
        data
    }

    #[test]
    fn test_request_applies_marker() {
        let processor = ImageProcessor::new(RawCodec::new());
        let reply = handle_request(&processor, &request([10, 20, 30], &encoded_frame(20, 20)))
            .expect("valid request should get a reply");

        let decoded = RawCodec::new().decode(&reply).unwrap();
        let center = (10 * 20 + 10) * 3;
        assert_eq!(&decoded.data[center..center + 3], &[30, 20, 10]);
        assert_eq!(&decoded.data[0..3], &[0, 0, 0]);
    }

    #[test]
    fn test_short_request_dropped() {
        let processor = ImageProcessor::new(RawCodec::new());

        // Exactly 3 bytes: a color with no image payload
        assert!(handle_request(&processor, &[10, 20, 30]).is_none());
        assert!(handle_request(&processor, &[]).is_none());
        assert!(handle_request(&processor, &[1, 2]).is_none());
    }

    #[test]
    fn test_undecodable_request_dropped() {
        let processor = ImageProcessor::new(RawCodec::new());

        assert!(handle_request(&processor, &request([1, 2, 3], b"not an image")).is_none());
    }

    #[tokio::test]
    async fn test_round_trip_over_websocket() {
        let server = Arc::new(SnapshotServer::new(ServerConfig::default(), RawCodec::new()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = Arc::clone(&server);
        tokio::spawn(async move {
            let _ = accept.serve(listener).await;
        });

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
            .await
            .unwrap();

        // A short request gets no reply; the valid one after it does
        ws.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        ws.send(Message::Binary(request([10, 20, 30], &encoded_frame(10, 10))))
            .await
            .unwrap();

        let reply = ws.next().await.unwrap().unwrap();
        let Message::Binary(body) = reply else {
            panic!("expected binary reply");
        };

        let decoded = RawCodec::new().decode(&body).unwrap();
        assert_eq!(decoded.width, 10);
        assert_eq!(decoded.height, 10);
        assert_eq!(decoded.pts, 1);
        let center = (5 * 10 + 5) * 3;
        assert_eq!(&decoded.data[center..center + 3], &[30, 20, 10]);

        ws.close(None).await.unwrap();
    }
}
