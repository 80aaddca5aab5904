#![deny(missing_docs)]
//! RGBA image buffer types and errors shared by the rasterkit crates

/// RGBA image buffer and single channel planes.
pub mod image;

/// Color values and hex string conversion.
pub mod color;

/// Error types for the image module.
pub mod error;

pub use crate::color::Rgb;
pub use crate::error::ImageError;
pub use crate::image::{GrayPlane, ImageBuffer, ImageSize, CHANNELS};
