use rasterkit_image::{ImageBuffer, CHANNELS};
use serde::{Deserialize, Serialize};

/// Interpolation mode for the resize operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Map a destination coordinate to the source, aligning pixel centers.
#[inline]
pub(crate) fn source_coord(dst: usize, scale: f32) -> f32 {
    (dst as f32 + 0.5) * scale - 0.5
}

/// Kernel for nearest neighbor interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
pub(crate) fn nearest_neighbor_interpolation(image: &ImageBuffer, u: f32, v: f32) -> [f32; 4] {
    let (rows, cols) = (image.rows(), image.cols());

    let iu = (u.round().max(0.0) as usize).min(cols - 1);
    let iv = (v.round().max(0.0) as usize).min(rows - 1);

    let base = (iv * cols + iu) * CHANNELS;
    let data = &image.as_slice()[base..base + CHANNELS];

    [
        data[0] as f32,
        data[1] as f32,
        data[2] as f32,
        data[3] as f32,
    ]
}

/// Kernel for bilinear interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel values.
pub(crate) fn bilinear_interpolation(image: &ImageBuffer, u: f32, v: f32) -> [f32; 4] {
    let (rows, cols) = (image.rows(), image.cols());

    let u = u.clamp(0.0, (cols - 1) as f32);
    let v = v.clamp(0.0, (rows - 1) as f32);

    let iu0 = u.trunc() as usize;
    let iv0 = v.trunc() as usize;

    let frac_u = u.fract();
    let frac_v = v.fract();

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let data = image.as_slice();
    let at = |row: usize, col: usize, k: usize| data[(row * cols + col) * CHANNELS + k] as f32;

    let mut pixel = [0.0; 4];
    for (k, p) in pixel.iter_mut().enumerate() {
        *p = at(iv0, iu0, k) * w00 + at(iv0, iu1, k) * w01 + at(iv1, iu0, k) * w10
            + at(iv1, iu1, k) * w11;
    }

    pixel
}

/// Sample a pixel with the given interpolation mode.
pub(crate) fn interpolate_pixel(
    image: &ImageBuffer,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
) -> [f32; 4] {
    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v),
        InterpolationMode::Nearest => nearest_neighbor_interpolation(image, u, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_image::ImageError;

    #[test]
    fn test_bilinear_midpoint() -> Result<(), ImageError> {
        let image = ImageBuffer::new([2, 1].into(), vec![0, 0, 0, 255, 100, 200, 50, 255])?;
        let px = bilinear_interpolation(&image, 0.5, 0.0);
        assert_eq!(px, [50.0, 100.0, 25.0, 255.0]);
        Ok(())
    }

    #[test]
    fn test_nearest_clamps_to_edges() -> Result<(), ImageError> {
        let image = ImageBuffer::new([2, 1].into(), vec![1, 1, 1, 1, 9, 9, 9, 9])?;
        assert_eq!(nearest_neighbor_interpolation(&image, -3.0, 0.0), [1.0; 4]);
        assert_eq!(nearest_neighbor_interpolation(&image, 7.0, 4.0), [9.0; 4]);
        Ok(())
    }

    #[test]
    fn test_source_coord_aligns_centers() {
        // 4 -> 2 pixels: destination centers land between source pixels
        assert_eq!(source_coord(0, 2.0), 0.5);
        assert_eq!(source_coord(1, 2.0), 2.5);
        assert_eq!(source_coord(0, 1.0), 0.0);
    }
}
