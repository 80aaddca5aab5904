use rasterkit_image::{ImageBuffer, ImageError, CHANNELS};
use serde::{Deserialize, Serialize};

use crate::color::{luma, sepia_tint};
use crate::filter::{gaussian_blur_f32, to_u8};
use crate::parallel::{self, ExecutionStrategy};

/// Adjustable tone and blur parameters applied by [`apply_filters`].
///
/// Percent-style values follow the usual filter-chain conventions: `100` is
/// neutral for brightness, contrast and saturation, `0` is neutral for
/// grayscale, sepia and blur.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Channel multiplier in percent, `[0, 200]`.
    pub brightness: f32,
    /// Contrast around mid-gray in percent, `[0, 200]`.
    pub contrast: f32,
    /// Distance from the luma in percent, `[0, 200]`.
    pub saturation: f32,
    /// Mix towards the luma in percent, `[0, 100]`.
    pub grayscale: f32,
    /// Mix towards the sepia tint in percent, `[0, 100]`.
    pub sepia: f32,
    /// Gaussian blur radius in pixels, `[0, 20]`.
    pub blur_radius: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            grayscale: 0.0,
            sepia: 0.0,
            blur_radius: 0.0,
        }
    }
}

fn check_range(name: &'static str, value: f32, max: f32) -> Result<(), ImageError> {
    if !(0.0..=max).contains(&value) {
        return Err(ImageError::invalid_parameter(name, value));
    }
    Ok(())
}

impl FilterParams {
    /// Check every parameter against its range.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] naming the first offending field.
    /// NaN is always rejected.
    pub fn validate(&self) -> Result<(), ImageError> {
        check_range("brightness", self.brightness, 200.0)?;
        check_range("contrast", self.contrast, 200.0)?;
        check_range("saturation", self.saturation, 200.0)?;
        check_range("grayscale", self.grayscale, 100.0)?;
        check_range("sepia", self.sepia, 100.0)?;
        check_range("blur_radius", self.blur_radius, 20.0)?;
        Ok(())
    }

    /// Whether every parameter sits at its neutral value.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    fn has_tone_stage(&self) -> bool {
        self.brightness != 100.0
            || self.contrast != 100.0
            || self.saturation != 100.0
            || self.grayscale != 0.0
            || self.sepia != 0.0
    }
}

/// Per-pixel tone stages 1 to 5, each followed by a clamp to `[0, 255]`.
#[inline]
fn tone_pixel(rgb: [f32; 3], params: &FilterParams) -> [f32; 3] {
    let clamp = |v: f32| v.clamp(0.0, 255.0);
    let mut c = rgb;

    if params.brightness != 100.0 {
        let k = params.brightness / 100.0;
        c = c.map(|v| clamp(v * k));
    }

    if params.contrast != 100.0 {
        let k = params.contrast / 100.0;
        c = c.map(|v| clamp((v - 127.5) * k + 127.5));
    }

    if params.saturation != 100.0 {
        let k = params.saturation / 100.0;
        let l = luma(c[0], c[1], c[2]);
        c = c.map(|v| clamp(l + (v - l) * k));
    }

    if params.grayscale != 0.0 {
        let t = params.grayscale / 100.0;
        let l = luma(c[0], c[1], c[2]);
        c = c.map(|v| clamp(v * (1.0 - t) + l * t));
    }

    if params.sepia != 0.0 {
        let t = params.sepia / 100.0;
        let tinted = sepia_tint(c);
        for (v, s) in c.iter_mut().zip(tinted) {
            *v = clamp(*v * (1.0 - t) + s * t);
        }
    }

    c
}

/// Apply the six filter stages in one pass with the default execution strategy.
///
/// See [`apply_filters_with`].
pub fn apply_filters(src: &ImageBuffer, params: &FilterParams) -> Result<ImageBuffer, ImageError> {
    apply_filters_with(src, params, ExecutionStrategy::default())
}

/// Apply brightness, contrast, saturation, grayscale, sepia and blur, in that order.
///
/// Stages 1 to 5 run per pixel on the color channels and leave alpha alone;
/// the blur stage filters all four channels. Samples stay in `f32` between
/// stages and are rounded once at the end. Neutral parameters return an exact
/// copy of the source.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `params` - The filter parameters.
/// * `strategy` - How rows are scheduled.
///
/// # Errors
///
/// Returns [`ImageError::InvalidParameter`] before touching any pixel if a
/// parameter is out of range.
///
/// # Example
///
/// ```
/// use rasterkit_image::{ImageBuffer, ImageSize};
/// use rasterkit_imgproc::enhance::{apply_filters, FilterParams};
///
/// let red = ImageBuffer::from_size_val(ImageSize { width: 1, height: 1 }, [255, 0, 0, 255]).unwrap();
/// let params = FilterParams { grayscale: 100.0, ..Default::default() };
///
/// let gray = apply_filters(&red, &params).unwrap();
/// assert_eq!(gray.as_slice(), &[76, 76, 76, 255]);
/// ```
pub fn apply_filters_with(
    src: &ImageBuffer,
    params: &FilterParams,
    strategy: ExecutionStrategy,
) -> Result<ImageBuffer, ImageError> {
    params.validate()?;

    if params.is_identity() {
        return Ok(src.clone());
    }

    log::trace!(
        "applying filters {:?} to {} ({:?})",
        params,
        src.size(),
        strategy
    );

    let mut samples = vec![0.0f32; src.as_slice().len()];

    if params.has_tone_stage() {
        parallel::par_iter_rows::<_, _, CHANNELS, CHANNELS>(
            src.as_slice(),
            &mut samples,
            src.cols(),
            strategy,
            |src_pixel, dst_pixel| {
                let rgb = [
                    src_pixel[0] as f32,
                    src_pixel[1] as f32,
                    src_pixel[2] as f32,
                ];
                let out = tone_pixel(rgb, params);
                dst_pixel[..3].copy_from_slice(&out);
                dst_pixel[3] = src_pixel[3] as f32;
            },
        );
    } else {
        samples
            .iter_mut()
            .zip(src.as_slice())
            .for_each(|(d, &s)| *d = s as f32);
    }

    let samples = gaussian_blur_f32::<CHANNELS>(
        samples,
        src.cols(),
        src.rows(),
        params.blur_radius,
        strategy,
    );

    ImageBuffer::new(src.size(), samples.into_iter().map(to_u8).collect())
}
