//! Decode, overlay, re-encode pipeline for whole images
//!
//! [`ImageProcessor`] bundles a codec pair and a marker style chosen at
//! construction time. It is the engine of the snapshot mode: each request
//! payload is decoded, marked, and re-encoded into a reply.

use bytes::Bytes;

use super::codec::{CodecError, ImageCodec};
use super::marker::{transform, MarkerColor, MarkerStyle};

/// Whole-image overlay processor
#[derive(Debug, Clone)]
pub struct ImageProcessor<C> {
    codec: C,
    style: MarkerStyle,
}

impl<C: ImageCodec> ImageProcessor<C> {
    /// Create a processor with the default marker style
    pub fn new(codec: C) -> Self {
        Self::with_style(codec, MarkerStyle::default())
    }

    /// Create a processor with a custom marker style
    pub fn with_style(codec: C, style: MarkerStyle) -> Self {
        Self { codec, style }
    }

    /// The configured marker style
    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    /// Decode a compressed image, overlay the marker, re-encode
    ///
    /// An undecodable payload is a reported error; no partial output is
    /// produced in that case.
    pub fn process(&self, data: &[u8], color: Option<MarkerColor>) -> Result<Bytes, CodecError> {
        let frame = self.codec.decode(data)?;
        let frame = transform(frame, color, &self.style);
        self.codec.encode(&frame)
    }
}
