//! Blurring for RGBA buffers and single channel planes.
//!
//! Everything here is built on one separable pass over `f32` rows, with
//! edges clamped to the nearest pixel.

/// Gaussian kernels and their sizing from a blur radius.
pub mod kernels;

mod ops;
pub use ops::*;

mod separable_filter;
pub use separable_filter::*;
