//! Image codec seam and the raw frame container
//!
//! The codec pair that converts between wire bytes and a raster frame is an
//! external capability behind the [`ImageCodec`] trait. [`RawCodec`] is the
//! built-in lossless container used by the snapshot mode and by tests.
//!
//! Raw container layout:
//!
//! ```text
//! +----------+-----------+----------+-----------+---------+------------+
//! | Magic(4) | Format(1) | Width(4) | Height(4) | Pts(8)  | Pixels(N)  |
//! +----------+-----------+----------+-----------+---------+------------+
//! ```
//!
//! All integers are big-endian; `N = width * height * 3`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::frame::{PixelFormat, RasterFrame};

const MAGIC: [u8; 4] = *b"RAW0";
const HEADER_LEN: usize = 4 + 1 + 4 + 4 + 8;

/// Codec pair converting between wire bytes and raster frames
///
/// A decode failure is a reported error; the caller must never forward a
/// partial frame built from an undecodable payload.
pub trait ImageCodec: Send + Sync + 'static {
    fn decode(&self, data: &[u8]) -> Result<RasterFrame, CodecError>;
    fn encode(&self, frame: &RasterFrame) -> Result<Bytes, CodecError>;
}

/// Codec error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Payload shorter than the container header
    Truncated,
    /// Magic bytes did not match
    BadMagic,
    /// Unknown pixel format tag
    UnknownFormat(u8),
    /// Pixel payload did not match the header dimensions
    PayloadSize { expected: u64, actual: u64 },
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Truncated => write!(f, "payload shorter than frame header"),
            CodecError::BadMagic => write!(f, "bad frame magic"),
            CodecError::UnknownFormat(tag) => write!(f, "unknown pixel format tag: {}", tag),
            CodecError::PayloadSize { expected, actual } => {
                write!(f, "pixel payload size mismatch: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Lossless raw frame container
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl RawCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for RawCodec {
    fn decode(&self, mut data: &[u8]) -> Result<RasterFrame, CodecError> {
        if data.len() < HEADER_LEN {
            return Err(CodecError::Truncated);
        }

        let mut magic = [0u8; 4];
        data.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(CodecError::BadMagic);
        }

        let format_tag = data.get_u8();
        let format = PixelFormat::from_byte(format_tag).ok_or(CodecError::UnknownFormat(format_tag))?;
        let width = data.get_u32();
        let height = data.get_u32();
        let pts = data.get_i64();

        let expected = width as u128 * height as u128 * format.bytes_per_pixel() as u128;
        if data.remaining() as u128 != expected {
            return Err(CodecError::PayloadSize {
                expected: expected.min(u64::MAX as u128) as u64,
                actual: data.remaining() as u64,
            });
        }

        Ok(RasterFrame::new(
            width,
            height,
            format,
            Bytes::copy_from_slice(data),
            pts,
        ))
    }

    fn encode(&self, frame: &RasterFrame) -> Result<Bytes, CodecError> {
        if frame.data.len() as u128
            != frame.width as u128 * frame.height as u128 * frame.format.bytes_per_pixel() as u128
        {
            return Err(CodecError::PayloadSize {
                expected: frame.pixel_len() as u64,
                actual: frame.data.len() as u64,
            });
        }

        let mut buf = BytesMut::with_capacity(HEADER_LEN + frame.data.len());
        buf.put_slice(&MAGIC);
        buf.put_u8(frame.format.as_byte());
        buf.put_u32(frame.width);
        buf.put_u32(frame.height);
        buf.put_i64(frame.pts);
        buf.put_slice(&frame.data);
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_lossless() {
        let codec = RawCodec::new();
        let frame = RasterFrame::solid(6, 4, PixelFormat::Bgr24, [7, 8, 9], -5);

        let encoded = codec.encode(&frame).unwrap();
        let decoded = codec.decode(&encoded).unwrap();

        assert_eq!(decoded.width, frame.width);
        assert_eq!(decoded.height, frame.height);
        assert_eq!(decoded.format, frame.format);
        assert_eq!(decoded.pts, frame.pts);
        assert_eq!(decoded.data, frame.data);
    }

    #[test]
    fn test_decode_truncated() {
        let codec = RawCodec::new();
        assert_eq!(codec.decode(b"RAW0"), Err(CodecError::Truncated));
        assert_eq!(codec.decode(&[]), Err(CodecError::Truncated));
    }

    #[test]
    fn test_decode_bad_magic() {
        let codec = RawCodec::new();
        let mut encoded = codec
            .encode(&RasterFrame::solid(2, 2, PixelFormat::Rgb24, [0, 0, 0], 0))
            .unwrap()
            .to_vec();
        encoded[0] = b'X';

        assert_eq!(codec.decode(&encoded), Err(CodecError::BadMagic));
    }

    #[test]
    fn test_decode_unknown_format() {
        let codec = RawCodec::new();
        let mut encoded = codec
            .encode(&RasterFrame::solid(2, 2, PixelFormat::Rgb24, [0, 0, 0], 0))
            .unwrap()
            .to_vec();
        encoded[4] = 9;

        assert_eq!(codec.decode(&encoded), Err(CodecError::UnknownFormat(9)));
    }

    #[test]
    fn test_decode_payload_size_mismatch() {
        let codec = RawCodec::new();
        let mut encoded = codec
            .encode(&RasterFrame::solid(2, 2, PixelFormat::Rgb24, [0, 0, 0], 0))
            .unwrap()
            .to_vec();
        encoded.pop();

        assert!(matches!(
            codec.decode(&encoded),
            Err(CodecError::PayloadSize { expected: 12, actual: 11 })
        ));
    }

    #[test]
    fn test_encode_rejects_mismatched_frame() {
        let codec = RawCodec::new();
        let frame = RasterFrame::new(10, 10, PixelFormat::Bgr24, Bytes::from_static(&[0; 3]), 0);

        assert!(matches!(
            codec.encode(&frame),
            Err(CodecError::PayloadSize { .. })
        ));
    }
}
