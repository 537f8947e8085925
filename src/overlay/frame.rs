//! Raster frame types
//!
//! A [`RasterFrame`] is the in-memory currency of the transform pipeline:
//! a decoded pixel buffer plus the metadata that must survive the overlay
//! untouched (dimensions, pixel layout, presentation timestamp).

use bytes::{Bytes, BytesMut};

/// Pixel layout of a raster frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 24-bit blue/green/red, 3 bytes per pixel
    Bgr24,
    /// 24-bit red/green/blue, 3 bytes per pixel
    Rgb24,
}

impl PixelFormat {
    /// Bytes per pixel for this layout
    pub fn bytes_per_pixel(&self) -> usize {
        3
    }

    /// Wire tag for this format
    pub fn as_byte(&self) -> u8 {
        match self {
            PixelFormat::Bgr24 => 0,
            PixelFormat::Rgb24 => 1,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(PixelFormat::Bgr24),
            1 => Some(PixelFormat::Rgb24),
            _ => None,
        }
    }
}

/// A decoded raster frame
///
/// Cheap to clone: the pixel payload is reference-counted via `Bytes`.
/// The overlay transform replaces pixel content only; width, height,
/// format, and the presentation timestamp pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Pixel layout of `data`
    pub format: PixelFormat,

    /// Packed pixel rows, `width * height * bytes_per_pixel` bytes
    pub data: Bytes,

    /// Presentation timestamp, opaque to the transform pipeline
    pub pts: i64,
}

impl RasterFrame {
    /// Create a frame from an existing pixel buffer
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Bytes, pts: i64) -> Self {
        Self {
            width,
            height,
            format,
            data,
            pts,
        }
    }

    /// Create a frame filled with a single pixel value (native byte order)
    ///
    /// Useful for synthetic sources in tests and demos.
    pub fn solid(width: u32, height: u32, format: PixelFormat, pixel: [u8; 3], pts: i64) -> Self {
        let count = width as usize * height as usize;
        let mut data = BytesMut::with_capacity(count * format.bytes_per_pixel());
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self::new(width, height, format, data.freeze(), pts)
    }

    /// Expected payload length in bytes for the frame's dimensions
    pub fn pixel_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}
