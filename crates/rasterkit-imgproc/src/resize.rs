use fast_image_resize as fr;
use rasterkit_image::{ImageBuffer, ImageError, ImageSize, CHANNELS};
use serde::{Deserialize, Serialize};

use crate::filter::to_u8;
use crate::interpolation::{interpolate_pixel, source_coord, InterpolationMode};
use crate::parallel::{self, ExecutionStrategy};

/// Lowest accepted encode quality.
pub const MIN_QUALITY: u8 = 10;
/// Highest accepted encode quality.
pub const MAX_QUALITY: u8 = 100;

/// Height that keeps the original aspect ratio for a new width.
///
/// `round(new_width * original.height / original.width)`
///
/// ```
/// use rasterkit_imgproc::resize::aspect_locked_height;
///
/// assert_eq!(aspect_locked_height([200, 100].into(), 100), 50);
/// ```
pub fn aspect_locked_height(original: ImageSize, new_width: u32) -> u32 {
    (new_width as f64 * original.height as f64 / original.width as f64).round() as u32
}

/// Width that keeps the original aspect ratio for a new height.
///
/// `round(new_height * original.width / original.height)`
pub fn aspect_locked_width(original: ImageSize, new_height: u32) -> u32 {
    (new_height as f64 * original.width as f64 / original.height as f64).round() as u32
}

/// Target of a resize operation.
///
/// With `aspect_locked` set the output keeps the source ratio: the width
/// drives and the height is derived from it, or the width is derived when only
/// a height is given (`target_width == 0`). A missing side deserializes as `0`.
///
/// `quality` is carried for a later lossy re-encode; the resample ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeSpec {
    /// Width of the output in pixels.
    #[serde(default)]
    pub target_width: u32,
    /// Height of the output in pixels.
    #[serde(default)]
    pub target_height: u32,
    /// Keep the source aspect ratio when one side is edited.
    pub aspect_locked: bool,
    /// Encode quality in `[10, 100]`.
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_quality() -> u8 {
    ResizeSpec::DEFAULT_QUALITY
}

impl ResizeSpec {
    /// Quality used when none is given.
    pub const DEFAULT_QUALITY: u8 = 90;

    /// Start a spec at the original dimensions.
    pub fn from_size(original: ImageSize, aspect_locked: bool) -> Self {
        Self {
            target_width: original.width,
            target_height: original.height,
            aspect_locked,
            quality: Self::DEFAULT_QUALITY,
        }
    }

    /// The target as an [`ImageSize`].
    pub fn target_size(&self) -> ImageSize {
        ImageSize {
            width: self.target_width,
            height: self.target_height,
        }
    }

    /// Change the width; the height follows when the aspect is locked.
    pub fn set_width(&mut self, original: ImageSize, width: u32) {
        self.target_width = width;
        if self.aspect_locked && !original.is_empty() {
            self.target_height = aspect_locked_height(original, width);
        }
    }

    /// Change the height; the width follows when the aspect is locked.
    pub fn set_height(&mut self, original: ImageSize, height: u32) {
        self.target_height = height;
        if self.aspect_locked && !original.is_empty() {
            self.target_width = aspect_locked_width(original, height);
        }
    }

    /// Check the target dimensions and the quality.
    ///
    /// A locked spec needs one non-zero side, an unlocked one needs both.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidDimensions`] for a missing side,
    /// [`ImageError::InvalidParameter`] for a quality outside `[10, 100]`.
    pub fn validate(&self) -> Result<(), ImageError> {
        let (w, h) = (self.target_width, self.target_height);
        let missing = if self.aspect_locked {
            w == 0 && h == 0
        } else {
            w == 0 || h == 0
        };
        if missing {
            return Err(ImageError::InvalidDimensions(w, h));
        }
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(ImageError::invalid_parameter("quality", self.quality));
        }
        Ok(())
    }

    /// The output size for a source of size `original`.
    ///
    /// # Errors
    ///
    /// Fails like [`ResizeSpec::validate`], or with
    /// [`ImageError::InvalidDimensions`] if the derived side rounds to zero.
    ///
    /// ```
    /// use rasterkit_imgproc::resize::ResizeSpec;
    ///
    /// let spec = ResizeSpec {
    ///     target_width: 100,
    ///     target_height: 100,
    ///     aspect_locked: true,
    ///     quality: 90,
    /// };
    /// assert_eq!(spec.resolve([200, 100].into()).unwrap(), [100, 50].into());
    /// ```
    pub fn resolve(&self, original: ImageSize) -> Result<ImageSize, ImageError> {
        self.validate()?;

        let size = if !self.aspect_locked || original.is_empty() {
            self.target_size()
        } else if self.target_width > 0 {
            ImageSize {
                width: self.target_width,
                height: aspect_locked_height(original, self.target_width),
            }
        } else {
            ImageSize {
                width: aspect_locked_width(original, self.target_height),
                height: self.target_height,
            }
        };

        check_target(size)?;
        Ok(size)
    }
}

fn check_target(new_size: ImageSize) -> Result<(), ImageError> {
    if new_size.is_empty() {
        return Err(ImageError::InvalidDimensions(new_size.width, new_size.height));
    }
    Ok(())
}

/// Resize an image to the spec's target with bilinear interpolation.
///
/// The output size comes from [`ResizeSpec::resolve`], so a locked spec keeps
/// the source ratio whatever its dependent side says.
///
/// # Errors
///
/// Fails before resampling if [`ResizeSpec::resolve`] fails.
///
/// # Example
///
/// ```
/// use rasterkit_image::{ImageBuffer, ImageSize};
/// use rasterkit_imgproc::resize::{resize, ResizeSpec};
///
/// let image = ImageBuffer::from_size_val(ImageSize { width: 200, height: 100 }, [0, 0, 0, 255]).unwrap();
///
/// let mut spec = ResizeSpec::from_size(image.size(), true);
/// spec.set_width(image.size(), 100);
///
/// let resized = resize(&image, &spec).unwrap();
/// assert_eq!(resized.width(), 100);
/// assert_eq!(resized.height(), 50);
/// ```
pub fn resize(src: &ImageBuffer, spec: &ResizeSpec) -> Result<ImageBuffer, ImageError> {
    resize_with(src, spec, ExecutionStrategy::ParallelRows)
}

/// Same as [`resize`], scheduled by `strategy`.
///
/// The backend always splits its work on the rayon pool it runs in, so a
/// serial run is installed into a single thread pool. Output is identical for
/// every strategy.
pub fn resize_with(
    src: &ImageBuffer,
    spec: &ResizeSpec,
    strategy: ExecutionStrategy,
) -> Result<ImageBuffer, ImageError> {
    let new_size = spec.resolve(src.size())?;
    if strategy.is_parallel(new_size.num_pixels()) {
        return resize_fast(src, new_size, InterpolationMode::Bilinear);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .map_err(|e| ImageError::ResizeFailed(e.to_string()))?;
    pool.install(|| resize_fast(src, new_size, InterpolationMode::Bilinear))
}

/// Resize an image with the pure Rust kernels.
///
/// Destination pixel centers are mapped onto the source grid and sampled with
/// the requested interpolation; samples outside the source are clamped.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `new_size` - The size of the output.
/// * `interpolation` - The interpolation mode to use.
/// * `strategy` - How rows are scheduled.
pub fn resize_native(
    src: &ImageBuffer,
    new_size: ImageSize,
    interpolation: InterpolationMode,
    strategy: ExecutionStrategy,
) -> Result<ImageBuffer, ImageError> {
    check_target(new_size)?;

    if new_size == src.size() {
        return Ok(src.clone());
    }

    let scale_x = src.cols() as f32 / new_size.width as f32;
    let scale_y = src.rows() as f32 / new_size.height as f32;
    let row_len = new_size.width as usize * CHANNELS;

    let mut data = vec![0u8; new_size.num_pixels() * CHANNELS];

    parallel::par_rows_mut(&mut data, row_len, new_size.num_pixels(), strategy, |r, row| {
        let v = source_coord(r, scale_y);
        for (c, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let u = source_coord(c, scale_x);
            let pixel = interpolate_pixel(src, u, v, interpolation);
            for (o, p) in out.iter_mut().zip(pixel) {
                *o = to_u8(p);
            }
        }
    });

    ImageBuffer::new(new_size, data)
}

/// Resize an image to a new size using the [fast_image_resize](https://crates.io/crates/fast_image_resize) crate.
///
/// Channels are resampled independently; alpha is not premultiplied.
///
/// # Errors
///
/// The function returns an error if the target is empty or the backend fails.
pub fn resize_fast(
    src: &ImageBuffer,
    new_size: ImageSize,
    interpolation: InterpolationMode,
) -> Result<ImageBuffer, ImageError> {
    check_target(new_size)?;

    let src_image = fr::images::ImageRef::new(
        src.width(),
        src.height(),
        src.as_slice(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ImageError::ResizeFailed(e.to_string()))?;

    let mut dst_image =
        fr::images::Image::new(new_size.width, new_size.height, fr::PixelType::U8x4);

    let algorithm = match interpolation {
        InterpolationMode::Bilinear => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
        InterpolationMode::Nearest => fr::ResizeAlg::Nearest,
    };
    let options = fr::ResizeOptions::new().resize_alg(algorithm).use_alpha(false);

    fr::Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| ImageError::ResizeFailed(e.to_string()))?;

    ImageBuffer::new(new_size, dst_image.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_companion() {
        let original = ImageSize {
            width: 200,
            height: 100,
        };
        assert_eq!(aspect_locked_height(original, 100), 50);
        assert_eq!(aspect_locked_width(original, 25), 50);
        // 333 * 100 / 200 = 166.5 rounds away from zero
        assert_eq!(aspect_locked_height(original, 333), 167);
    }

    #[test]
    fn spec_follows_aspect_lock() {
        let original = ImageSize {
            width: 200,
            height: 100,
        };
        let mut locked = ResizeSpec::from_size(original, true);
        locked.set_width(original, 100);
        assert_eq!(locked.target_size(), [100, 50].into());
        locked.set_height(original, 80);
        assert_eq!(locked.target_size(), [160, 80].into());

        let mut free = ResizeSpec::from_size(original, false);
        free.set_width(original, 100);
        assert_eq!(free.target_size(), [100, 100].into());
    }

    #[test]
    fn resize_rejects_zero_target() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([4, 4].into(), [0, 0, 0, 255])?;
        let spec = ResizeSpec {
            target_width: 0,
            target_height: 10,
            aspect_locked: false,
            quality: 90,
        };
        assert_eq!(resize(&image, &spec), Err(ImageError::InvalidDimensions(0, 10)));
        Ok(())
    }

    #[test]
    fn resize_rejects_bad_quality() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([4, 4].into(), [0, 0, 0, 255])?;
        for quality in [0, 9, 101] {
            let spec = ResizeSpec {
                quality,
                ..ResizeSpec::from_size(image.size(), false)
            };
            assert!(matches!(
                resize(&image, &spec),
                Err(ImageError::InvalidParameter { name: "quality", .. })
            ));
        }
        Ok(())
    }

    #[test]
    fn resize_smoke() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([4, 5].into(), [10, 20, 30, 255])?;
        let spec = ResizeSpec {
            target_width: 2,
            target_height: 3,
            aspect_locked: false,
            quality: 90,
        };
        let resized = resize(&image, &spec)?;
        assert_eq!(resized.size(), [2, 3].into());
        assert!(resized.pixels().all(|p| p == [10, 20, 30, 255]));
        Ok(())
    }

    #[test]
    fn resize_native_nearest_downscale() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let data = [
            1u8, 2, 3, 4,
            5, 6, 7, 8,
        ]
        .iter()
        .flat_map(|&v| [v, v, v, 255])
        .collect();
        let image = ImageBuffer::new([4, 2].into(), data)?;

        let out = resize_native(
            &image,
            [2, 1].into(),
            InterpolationMode::Nearest,
            ExecutionStrategy::Serial,
        )?;
        // centers map to (0.5, 0.5) and (2.5, 0.5), rounding to (1, 1) and (3, 1)
        assert_eq!(out.get_pixel(0, 0), Some([6, 6, 6, 255]));
        assert_eq!(out.get_pixel(1, 0), Some([8, 8, 8, 255]));
        Ok(())
    }

    #[test]
    fn resize_native_is_deterministic() -> Result<(), ImageError> {
        let data = (0..6 * 4 * 4).map(|v| (v * 5 % 256) as u8).collect();
        let image = ImageBuffer::new([6, 4].into(), data)?;
        let a = resize_native(
            &image,
            [9, 7].into(),
            InterpolationMode::Bilinear,
            ExecutionStrategy::Serial,
        )?;
        let b = resize_native(
            &image,
            [9, 7].into(),
            InterpolationMode::Bilinear,
            ExecutionStrategy::ParallelRows,
        )?;
        assert_eq!(a, b);
        assert_eq!(a.size(), [9, 7].into());
        Ok(())
    }

    #[test]
    fn locked_resize_derives_dependent_side() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([200, 100].into(), [0, 0, 0, 255])?;

        // a stale height does not distort the output
        let stale = ResizeSpec {
            target_width: 100,
            target_height: 100,
            aspect_locked: true,
            quality: 90,
        };
        assert_eq!(resize(&image, &stale)?.size(), [100, 50].into());

        let height_only = ResizeSpec {
            target_width: 0,
            target_height: 25,
            ..stale
        };
        assert_eq!(resize(&image, &height_only)?.size(), [50, 25].into());

        let unlocked = ResizeSpec {
            aspect_locked: false,
            ..stale
        };
        assert_eq!(resize(&image, &unlocked)?.size(), [100, 100].into());
        Ok(())
    }

    #[test]
    fn locked_resize_rejects_missing_sides() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([200, 100].into(), [0, 0, 0, 255])?;
        let spec = ResizeSpec {
            target_width: 0,
            target_height: 0,
            aspect_locked: true,
            quality: 90,
        };
        assert_eq!(resize(&image, &spec), Err(ImageError::InvalidDimensions(0, 0)));

        // 1 * 1 / 200 rounds to a zero height
        let tall = ImageBuffer::from_size_val([200, 1].into(), [0, 0, 0, 255])?;
        let spec = ResizeSpec {
            target_width: 1,
            ..spec
        };
        assert_eq!(resize(&tall, &spec), Err(ImageError::InvalidDimensions(1, 0)));
        Ok(())
    }

    #[test]
    fn width_only_spec_from_json() -> Result<(), ImageError> {
        let spec: ResizeSpec =
            serde_json::from_str(r#"{"target_width": 100, "aspect_locked": true}"#)
                .map_err(|e| ImageError::invalid_parameter("json", e))?;
        assert_eq!(spec.target_height, 0);
        assert_eq!(spec.quality, ResizeSpec::DEFAULT_QUALITY);
        assert_eq!(spec.resolve([200, 100].into())?, [100, 50].into());
        Ok(())
    }

    #[test]
    fn resize_strategies_agree() -> Result<(), ImageError> {
        let data = (0..40 * 30 * 4).map(|v| (v * 7 % 256) as u8).collect();
        let image = ImageBuffer::new([40, 30].into(), data)?;
        let spec = ResizeSpec {
            target_width: 17,
            target_height: 0,
            aspect_locked: true,
            quality: 90,
        };
        let serial = resize_with(&image, &spec, ExecutionStrategy::Serial)?;
        let parallel = resize_with(&image, &spec, ExecutionStrategy::ParallelRows)?;
        assert_eq!(serial, parallel);
        assert_eq!(serial.size(), [17, 13].into());
        Ok(())
    }
}
