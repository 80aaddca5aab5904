use rasterkit_image::{GrayPlane, ImageBuffer, ImageError, CHANNELS};

use crate::color::{gray_from_rgba, invert_plane};
use crate::filter::gaussian_blur_plane;
use crate::parallel::{self, ExecutionStrategy};

/// Largest accepted blur radius.
pub const MAX_SKETCH_RADIUS: f32 = 20.0;

/// The two intermediate layers of a pencil sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchLayers {
    /// The luma of the source.
    pub base: GrayPlane,
    /// The blurred inverse of `base`.
    pub blend: GrayPlane,
}

/// Color dodge of two 8-bit values.
///
/// `255` when `blend` is saturated, otherwise `base * 255 / (255 - blend)`
/// capped at `255` and rounded.
#[inline]
pub fn color_dodge(base: u8, blend: u8) -> u8 {
    if blend == 255 {
        return 255;
    }
    let v = base as f32 * 255.0 / (255 - blend) as f32;
    v.min(255.0).round() as u8
}

fn check_radius(blur_radius: f32) -> Result<(), ImageError> {
    if !(0.0..=MAX_SKETCH_RADIUS).contains(&blur_radius) {
        return Err(ImageError::invalid_parameter("blur_radius", blur_radius));
    }
    Ok(())
}

/// Compute the base and blend layers of a sketch.
///
/// # Errors
///
/// [`ImageError::InvalidParameter`] if `blur_radius` is outside `[0, 20]`.
pub fn sketch_layers(
    src: &ImageBuffer,
    blur_radius: f32,
    strategy: ExecutionStrategy,
) -> Result<SketchLayers, ImageError> {
    check_radius(blur_radius)?;

    let base = gray_from_rgba(src, strategy)?;
    let blend = gaussian_blur_plane(&invert_plane(&base)?, blur_radius, strategy)?;

    Ok(SketchLayers { base, blend })
}

/// Render a pencil sketch with the default execution strategy.
///
/// See [`sketch_with`].
pub fn sketch(src: &ImageBuffer, blur_radius: f32) -> Result<ImageBuffer, ImageError> {
    sketch_with(src, blur_radius, ExecutionStrategy::default())
}

/// Render a pencil sketch of an image.
///
/// The luma is dodged with its own blurred inverse: flat areas wash out to
/// white and edges stay dark, wider for larger radii. A zero radius gives an
/// all-white image. The result is gray with the source alpha.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `blur_radius` - Gaussian sigma in `[0, 20]`.
/// * `strategy` - How rows are scheduled.
///
/// # Example
///
/// ```
/// use rasterkit_image::{ImageBuffer, ImageSize};
/// use rasterkit_imgproc::sketch::sketch;
///
/// let flat = ImageBuffer::from_size_val(ImageSize { width: 8, height: 8 }, [90, 90, 90, 200]).unwrap();
/// let out = sketch(&flat, 4.0).unwrap();
/// assert!(out.pixels().all(|p| p == [255, 255, 255, 200]));
/// ```
pub fn sketch_with(
    src: &ImageBuffer,
    blur_radius: f32,
    strategy: ExecutionStrategy,
) -> Result<ImageBuffer, ImageError> {
    let SketchLayers { base, blend } = sketch_layers(src, blur_radius, strategy)?;

    log::trace!("sketch of {} with radius {}", src.size(), blur_radius);

    let mut data = src.as_slice().to_vec();
    let row_len = src.row_stride();
    let cols = src.cols();

    parallel::par_rows_mut(&mut data, row_len, src.size().num_pixels(), strategy, |r, row| {
        let offset = r * cols;
        let a = &base.as_slice()[offset..offset + cols];
        let b = &blend.as_slice()[offset..offset + cols];
        for ((px, &a), &b) in row.chunks_exact_mut(CHANNELS).zip(a).zip(b) {
            let v = color_dodge(a, b);
            px[0] = v;
            px[1] = v;
            px[2] = v;
        }
    });

    ImageBuffer::new(src.size(), data)
}
