use rasterkit_image::{GrayPlane, ImageBuffer, ImageError, CHANNELS};

use super::{kernels, separable_filter};
use crate::parallel::ExecutionStrategy;

fn check_radius(radius: f32) -> Result<(), ImageError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(ImageError::invalid_parameter("blur_radius", radius));
    }
    Ok(())
}

#[inline]
pub(crate) fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Gaussian blur of interleaved `f32` samples with `sigma = radius`.
///
/// Returns the input unchanged for a zero radius.
pub(crate) fn gaussian_blur_f32<const C: usize>(
    src: Vec<f32>,
    cols: usize,
    rows: usize,
    radius: f32,
    strategy: ExecutionStrategy,
) -> Vec<f32> {
    if radius <= 0.0 {
        return src;
    }

    let kernel = kernels::gaussian_kernel_1d(kernels::kernel_size_for_radius(radius), radius);
    let mut dst = vec![0.0f32; src.len()];
    separable_filter::<C>(&src, &mut dst, cols, rows, &kernel, &kernel, strategy);
    dst
}

/// Blur an RGBA image with a gaussian filter.
///
/// All four channels are filtered; edges are clamped.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `radius` - The standard deviation of the gaussian in pixels. Zero is a no-op.
/// * `strategy` - How rows are scheduled.
///
/// # Errors
///
/// Returns [`ImageError::InvalidParameter`] for a negative or non-finite radius.
pub fn gaussian_blur(
    src: &ImageBuffer,
    radius: f32,
    strategy: ExecutionStrategy,
) -> Result<ImageBuffer, ImageError> {
    check_radius(radius)?;

    if radius == 0.0 {
        return Ok(src.clone());
    }

    let samples = src.as_slice().iter().map(|&v| v as f32).collect();
    let blurred = gaussian_blur_f32::<CHANNELS>(samples, src.cols(), src.rows(), radius, strategy);

    ImageBuffer::new(src.size(), blurred.into_iter().map(to_u8).collect())
}

/// Blur a single channel plane with a gaussian filter.
///
/// # Errors
///
/// Returns [`ImageError::InvalidParameter`] for a negative or non-finite radius.
pub fn gaussian_blur_plane(
    src: &GrayPlane,
    radius: f32,
    strategy: ExecutionStrategy,
) -> Result<GrayPlane, ImageError> {
    check_radius(radius)?;

    if radius == 0.0 {
        return Ok(src.clone());
    }

    let samples = src.as_slice().iter().map(|&v| v as f32).collect();
    let blurred = gaussian_blur_f32::<1>(samples, src.cols(), src.rows(), radius, strategy);

    GrayPlane::new(src.size(), blurred.into_iter().map(to_u8).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_blur_zero_radius_is_copy() -> Result<(), ImageError> {
        let image = ImageBuffer::new([2, 1].into(), vec![1, 2, 3, 4, 5, 6, 7, 8])?;
        let out = gaussian_blur(&image, 0.0, ExecutionStrategy::Serial)?;
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_rejects_bad_radius() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([2, 2].into(), [0, 0, 0, 255])?;
        for radius in [-1.0, f32::NAN, f32::INFINITY] {
            let res = gaussian_blur(&image, radius, ExecutionStrategy::Serial);
            assert!(matches!(
                res,
                Err(ImageError::InvalidParameter { name: "blur_radius", .. })
            ));
        }
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_keeps_flat_image() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([9, 7].into(), [10, 120, 250, 255])?;
        let out = gaussian_blur(&image, 2.5, ExecutionStrategy::ParallelRows)?;
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_plane_spreads_impulse() -> Result<(), ImageError> {
        let mut data = vec![0u8; 25];
        data[12] = 255;
        let plane = GrayPlane::new([5, 5].into(), data)?;

        let out = gaussian_blur_plane(&plane, 1.0, ExecutionStrategy::Serial)?;
        let center = out.get(2, 2).unwrap_or_default();
        let neighbor = out.get(3, 2).unwrap_or_default();

        assert!(center < 255);
        assert!(neighbor > 0);
        assert!(center > neighbor);
        Ok(())
    }
}
