//! Marker color and rectangle overlay
//!
//! The marker is a solid, centered rectangle drawn over each outgoing frame.
//! Color values arrive from untrusted control messages, so the color type is
//! only constructible from validated input: a stored [`MarkerColor`] is
//! always a well-formed RGB 3-tuple.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

use super::frame::{PixelFormat, RasterFrame};

/// A validated RGB marker color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl MarkerColor {
    /// Create a color from component values
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Validate a raw control payload into a color
    ///
    /// Accepts exactly 3 components, each within `[0, 255]`.
    pub fn try_from_raw(raw: &[i64]) -> Result<Self, InvalidColor> {
        if raw.len() != 3 {
            return Err(InvalidColor::WrongArity(raw.len()));
        }
        for &component in raw {
            if !(0..=255).contains(&component) {
                return Err(InvalidColor::OutOfRange(component));
            }
        }
        Ok(Self::new(raw[0] as u8, raw[1] as u8, raw[2] as u8))
    }

    /// Pack into the low 24 bits of a word (`0xRRGGBB`)
    pub(crate) fn pack(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub(crate) fn unpack(word: u32) -> Self {
        Self::new((word >> 16) as u8, (word >> 8) as u8, word as u8)
    }

    /// Component bytes in a frame's native pixel order
    fn native_order(&self, format: PixelFormat) -> [u8; 3] {
        match format {
            PixelFormat::Bgr24 => [self.b, self.g, self.r],
            PixelFormat::Rgb24 => [self.r, self.g, self.b],
        }
    }
}

impl std::fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Rejected control payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidColor {
    /// Payload did not have exactly 3 components
    WrongArity(usize),
    /// A component fell outside `[0, 255]`
    OutOfRange(i64),
}

impl std::fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidColor::WrongArity(n) => write!(f, "expected 3 color components, got {}", n),
            InvalidColor::OutOfRange(v) => write!(f, "color component {} outside [0, 255]", v),
        }
    }
}

impl std::error::Error for InvalidColor {}

/// Fill proportions of the centered marker rectangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Rectangle width as a proportion of frame width
    pub width_proportion: f64,
    /// Rectangle height as a proportion of frame height
    pub height_proportion: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            width_proportion: 0.3,
            height_proportion: 0.3,
        }
    }
}

impl MarkerStyle {
    /// Create a style with custom proportions
    pub fn new(width_proportion: f64, height_proportion: f64) -> Self {
        Self {
            width_proportion,
            height_proportion,
        }
    }

    /// Pixel bounds of the marker rectangle, centered and clamped to the frame
    ///
    /// Half-open on both axes: `[x0, x1) x [y0, y1)`.
    fn centered_rect(&self, width: u32, height: u32) -> Rect {
        let rect_w = (width as f64 * self.width_proportion) as u32;
        let rect_h = (height as f64 * self.height_proportion) as u32;

        let center_x = width / 2;
        let center_y = height / 2;

        let x0 = center_x.saturating_sub(rect_w / 2);
        let y0 = center_y.saturating_sub(rect_h / 2);
        let x1 = x0.saturating_add(rect_w).min(width);
        let y1 = y0.saturating_add(rect_h).min(height);

        Rect { x0, y0, x1, y1 }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Rect {
    fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// Overlay the marker onto a frame
///
/// With no color set this is the identity on pixel content, the expected
/// steady state before the first control message arrives. With a color, the
/// centered rectangle is filled solid in the frame's native pixel order.
/// Dimensions, format, and `pts` pass through unchanged.
pub fn transform(frame: RasterFrame, color: Option<MarkerColor>, style: &MarkerStyle) -> RasterFrame {
    let Some(color) = color else {
        return frame;
    };

    if frame.data.len() != frame.pixel_len() {
        tracing::warn!(
            expected = frame.pixel_len(),
            actual = frame.data.len(),
            "frame payload does not match its dimensions, skipping overlay"
        );
        return frame;
    }

    let rect = style.centered_rect(frame.width, frame.height);
    if rect.is_empty() {
        return frame;
    }

    let pixel = color.native_order(frame.format);
    let mut pixels = BytesMut::from(frame.data.as_ref());
    let stride = frame.width as usize * frame.format.bytes_per_pixel();

    for y in rect.y0..rect.y1 {
        let row = y as usize * stride;
        for x in rect.x0..rect.x1 {
            let offset = row + x as usize * 3;
            pixels[offset..offset + 3].copy_from_slice(&pixel);
        }
    }

    RasterFrame {
        data: pixels.freeze(),
        ..frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_frame(width: u32, height: u32) -> RasterFrame {
        RasterFrame::solid(width, height, PixelFormat::Bgr24, [9, 9, 9], 42)
    }

    #[test]
    fn test_unset_color_is_identity() {
        let frame = base_frame(40, 30);
        let out = transform(frame.clone(), None, &MarkerStyle::default());

        assert_eq!(out.data, frame.data);
        assert_eq!(out.pts, 42);
    }

    #[test]
    fn test_marker_changes_only_centered_rect() {
        let style = MarkerStyle::default();
        let frame = base_frame(40, 30);
        let color = MarkerColor::new(10, 20, 30);

        let out = transform(frame.clone(), Some(color), &style);

        assert_eq!(out.width, frame.width);
        assert_eq!(out.height, frame.height);
        assert_eq!(out.pts, frame.pts);

        // 30% of 40x30 centered: x in [14, 26), y in [11, 20)
        let rect = style.centered_rect(40, 30);
        assert_eq!((rect.x0, rect.y0, rect.x1, rect.y1), (14, 11, 26, 20));

        for y in 0..30u32 {
            for x in 0..40u32 {
                let offset = (y * 40 + x) as usize * 3;
                let px = &out.data[offset..offset + 3];
                if rect.contains(x, y) {
                    // Bgr24 native order
                    assert_eq!(px, &[30, 20, 10], "inside rect at ({}, {})", x, y);
                } else {
                    assert_eq!(px, &frame.data[offset..offset + 3], "outside rect at ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_rgb_native_order() {
        let frame = RasterFrame::solid(10, 10, PixelFormat::Rgb24, [0, 0, 0], 0);
        let out = transform(frame, Some(MarkerColor::new(10, 20, 30)), &MarkerStyle::default());

        // center pixel
        let offset = (5 * 10 + 5) * 3;
        assert_eq!(&out.data[offset..offset + 3], &[10, 20, 30]);
    }

    #[test]
    fn test_oversized_proportion_clamps_to_frame() {
        let style = MarkerStyle::new(2.0, 2.0);
        let frame = base_frame(8, 8);
        let out = transform(frame, Some(MarkerColor::new(1, 2, 3)), &style);

        // Whole frame filled, nothing out of bounds
        for chunk in out.data.chunks_exact(3) {
            assert_eq!(chunk, &[3, 2, 1]);
        }
    }

    #[test]
    fn test_zero_proportion_is_identity_on_pixels() {
        let style = MarkerStyle::new(0.0, 0.0);
        let frame = base_frame(16, 16);
        let out = transform(frame.clone(), Some(MarkerColor::new(1, 2, 3)), &style);

        assert_eq!(out.data, frame.data);
    }

    #[test]
    fn test_mismatched_payload_passes_through() {
        let frame = RasterFrame::new(
            100,
            100,
            PixelFormat::Bgr24,
            bytes::Bytes::from_static(&[0; 12]),
            7,
        );
        let out = transform(frame.clone(), Some(MarkerColor::new(1, 2, 3)), &MarkerStyle::default());

        assert_eq!(out.data, frame.data);
    }

    #[test]
    fn test_try_from_raw_accepts_valid() {
        let color = MarkerColor::try_from_raw(&[10, 20, 30]).unwrap();
        assert_eq!(color, MarkerColor::new(10, 20, 30));

        assert!(MarkerColor::try_from_raw(&[0, 0, 0]).is_ok());
        assert!(MarkerColor::try_from_raw(&[255, 255, 255]).is_ok());
    }

    #[test]
    fn test_try_from_raw_rejects_wrong_arity() {
        assert_eq!(
            MarkerColor::try_from_raw(&[10, 20]),
            Err(InvalidColor::WrongArity(2))
        );
        assert_eq!(
            MarkerColor::try_from_raw(&[10, 20, 30, 40]),
            Err(InvalidColor::WrongArity(4))
        );
        assert_eq!(MarkerColor::try_from_raw(&[]), Err(InvalidColor::WrongArity(0)));
    }

    #[test]
    fn test_try_from_raw_rejects_out_of_range() {
        assert_eq!(
            MarkerColor::try_from_raw(&[10, 20, 300]),
            Err(InvalidColor::OutOfRange(300))
        );
        assert_eq!(
            MarkerColor::try_from_raw(&[-1, 20, 30]),
            Err(InvalidColor::OutOfRange(-1))
        );
    }

    #[test]
    fn test_pack_unpack() {
        let color = MarkerColor::new(1, 2, 3);
        assert_eq!(MarkerColor::unpack(color.pack()), color);
    }
}
