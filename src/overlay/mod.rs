//! Frame overlay primitives
//!
//! This module provides:
//! - Raster frame types shared by both relay modes
//! - The marker color/style types and the per-frame overlay transform
//! - The image codec seam and the built-in lossless raw container
//! - The whole-image decode/overlay/encode processor for the snapshot mode

pub mod codec;
pub mod frame;
pub mod marker;
pub mod processor;

pub use codec::{CodecError, ImageCodec, RawCodec};
pub use frame::{PixelFormat, RasterFrame};
pub use marker::{transform, InvalidColor, MarkerColor, MarkerStyle};
pub use processor::ImageProcessor;
