#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
/// color conversions and luma helpers.
pub mod color;

/// engine configuration.
pub mod config;

/// image cropping and crop selection module.
pub mod crop;

/// image enhancement module.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// built-in bitmap font.
pub mod font;

/// utilities for interpolation.
pub mod interpolation;

/// dominant color extraction.
pub mod palette;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// edit sessions and operation pipelines.
pub mod session;

/// pencil sketch compositing.
pub mod sketch;

/// text watermarks.
pub mod watermark;
