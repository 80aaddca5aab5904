use rasterkit_image::{GrayPlane, ImageBuffer, ImageError, CHANNELS};

use crate::parallel::{self, ExecutionStrategy};

/// Define the RGB weights for the luma computation.
pub const RW: f32 = 0.299;
/// Green weight of the luma.
pub const GW: f32 = 0.587;
/// Blue weight of the luma.
pub const BW: f32 = 0.114;

/// Fixed sepia tint matrix, one row per output channel.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Perceptual brightness of a color:
///
/// L = 0.299 * R + 0.587 * G + 0.114 * B
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    RW * r + GW * g + BW * b
}

/// Apply the sepia matrix to a color, clamping each channel to `[0, 255]`.
#[inline]
pub fn sepia_tint(rgb: [f32; 3]) -> [f32; 3] {
    let mut out = [0.0; 3];
    for (o, row) in out.iter_mut().zip(SEPIA_MATRIX.iter()) {
        *o = (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 255.0);
    }
    out
}

/// Compute the rounded luma plane of an RGBA image. Alpha is ignored.
///
/// # Example
///
/// ```
/// use rasterkit_image::{ImageBuffer, ImageSize};
/// use rasterkit_imgproc::color::gray_from_rgba;
/// use rasterkit_imgproc::parallel::ExecutionStrategy;
///
/// let red = ImageBuffer::from_size_val(ImageSize { width: 2, height: 2 }, [255, 0, 0, 255]).unwrap();
/// let gray = gray_from_rgba(&red, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(gray.as_slice(), &[76, 76, 76, 76]);
/// ```
pub fn gray_from_rgba(
    src: &ImageBuffer,
    strategy: ExecutionStrategy,
) -> Result<GrayPlane, ImageError> {
    let mut gray = GrayPlane::from_size_val(src.size(), 0)?;

    parallel::par_iter_rows::<_, _, CHANNELS, 1>(
        src.as_slice(),
        gray.as_slice_mut(),
        src.cols(),
        strategy,
        |src_pixel, dst_pixel| {
            let l = luma(src_pixel[0] as f32, src_pixel[1] as f32, src_pixel[2] as f32);
            dst_pixel[0] = l.round().clamp(0.0, 255.0) as u8;
        },
    );

    Ok(gray)
}

/// Invert a plane: `255 - v`.
pub fn invert_plane(src: &GrayPlane) -> Result<GrayPlane, ImageError> {
    let data = src.as_slice().iter().map(|&v| 255 - v).collect();
    GrayPlane::new(src.size(), data)
}
