#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and encoding/decoding failures.
pub mod error;

/// The [`codec::ImageCodec`] boundary and its `image` crate implementation.
pub mod codec;

/// High-level image reading and writing functions.
///
/// See [`functional::read_image_any_rgba8`] for automatic format detection.
pub mod functional;

pub use crate::codec::{DefaultCodec, EncodeFormat, ImageCodec};
pub use crate::error::IoError;
