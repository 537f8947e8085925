//! Media track endpoints
//!
//! A track is a one-way stream of raster frames between the negotiated
//! transport and the transform pipeline. The endpoints wrap a bounded
//! channel so a stalled consumer applies backpressure to its producer
//! without touching any other task of the session.

use tokio::sync::mpsc;

use crate::overlay::RasterFrame;

/// Create a connected sink/track pair with the given buffer depth
pub fn track(capacity: usize) -> (TrackSink, MediaTrack) {
    let (tx, rx) = mpsc::channel(capacity);
    (TrackSink { tx }, MediaTrack { rx })
}

/// Writing end of a media track
#[derive(Debug, Clone)]
pub struct TrackSink {
    tx: mpsc::Sender<RasterFrame>,
}

impl TrackSink {
    /// Send a frame, waiting for buffer space if the consumer is behind
    pub async fn send(&self, frame: RasterFrame) -> Result<(), TrackClosed> {
        self.tx.send(frame).await.map_err(|_| TrackClosed)
    }

    /// Whether the receiving end has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Reading end of a media track
#[derive(Debug)]
pub struct MediaTrack {
    rx: mpsc::Receiver<RasterFrame>,
}

impl MediaTrack {
    /// Receive the next frame
    ///
    /// Returns `None` once every sink for this track has been dropped.
    pub async fn recv(&mut self) -> Option<RasterFrame> {
        self.rx.recv().await
    }
}

/// The other end of the track has been dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackClosed;

impl std::fmt::Display for TrackClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "media track closed")
    }
}

impl std::error::Error for TrackClosed {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::PixelFormat;

    #[test]
    fn test_track_delivers_in_order() {
        tokio_test::block_on(async {
            let (sink, mut track) = track(4);

            for pts in 0..3 {
                let frame = RasterFrame::solid(2, 2, PixelFormat::Bgr24, [0, 0, 0], pts);
                sink.send(frame).await.unwrap();
            }

            for pts in 0..3 {
                assert_eq!(track.recv().await.unwrap().pts, pts);
            }
        });
    }

    #[test]
    fn test_send_after_drop_errors() {
        tokio_test::block_on(async {
            let (sink, track) = track(1);
            drop(track);

            let frame = RasterFrame::solid(2, 2, PixelFormat::Bgr24, [0, 0, 0], 0);
            assert_eq!(sink.send(frame).await, Err(TrackClosed));
            assert!(sink.is_closed());
        });
    }

    #[test]
    fn test_recv_after_sink_drop_is_none() {
        tokio_test::block_on(async {
            let (sink, mut track) = track(1);
            drop(sink);

            assert!(track.recv().await.is_none());
        });
    }
}
