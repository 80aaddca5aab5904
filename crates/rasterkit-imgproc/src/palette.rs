use std::collections::HashMap;

use rasterkit_image::{ImageBuffer, ImageError, ImageSize, Rgb};
use serde::{Deserialize, Serialize};

use crate::interpolation::InterpolationMode;
use crate::parallel::ExecutionStrategy;
use crate::resize::resize_native;

/// Width of a quantization bucket per channel.
const BUCKET: f32 = 32.0;
/// Highest bucket value, so every channel has exactly eight buckets.
const MAX_BUCKET: u8 = 224;

/// One entry of an extracted palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSwatch {
    /// The bucket color as lowercase `#rrggbb`.
    pub hex: String,
    /// The bucket color.
    pub rgb: Rgb,
    /// Number of sampled pixels that fell into the bucket.
    pub frequency: u32,
}

/// Tunables of the palette extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Maximum number of swatches returned.
    pub max_colors: usize,
    /// The longer side is downsampled to at most this many pixels.
    pub max_side: u32,
    /// Every `sample_stride`-th pixel is sampled.
    pub sample_stride: usize,
    /// Pixels with a lower alpha are ignored.
    pub alpha_threshold: u8,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_colors: 8,
            max_side: 200,
            sample_stride: 5,
            alpha_threshold: 128,
        }
    }
}

impl PaletteConfig {
    fn validate(&self) -> Result<(), ImageError> {
        if self.max_colors == 0 {
            return Err(ImageError::invalid_parameter("max_colors", self.max_colors));
        }
        if self.max_side == 0 {
            return Err(ImageError::invalid_parameter("max_side", self.max_side));
        }
        if self.sample_stride == 0 {
            return Err(ImageError::invalid_parameter(
                "sample_stride",
                self.sample_stride,
            ));
        }
        Ok(())
    }
}

/// Snap a channel to its bucket, `round(c / 32) * 32` capped at 224.
#[inline]
pub fn quantize_channel(c: u8) -> u8 {
    let bucket = (c as f32 / BUCKET).round() * BUCKET;
    (bucket as u32).min(MAX_BUCKET as u32) as u8
}

fn downsample_size(size: ImageSize, max_side: u32) -> ImageSize {
    let longer = size.longer_side();
    if longer <= max_side {
        return size;
    }
    let scale = max_side as f64 / longer as f64;
    let side = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    ImageSize {
        width: side(size.width),
        height: side(size.height),
    }
}

/// Extract the dominant colors with the default sampling settings.
///
/// See [`extract_palette_with`].
pub fn extract_palette(
    src: &ImageBuffer,
    max_colors: usize,
) -> Result<Vec<ColorSwatch>, ImageError> {
    extract_palette_with(
        src,
        &PaletteConfig {
            max_colors,
            ..Default::default()
        },
    )
}

/// Extract the dominant colors of an image.
///
/// The image is downsampled with nearest neighbor so that its longer side is
/// at most `max_side`, then every `sample_stride`-th pixel with enough alpha
/// is snapped to a 32 wide bucket per channel and counted. Swatches come out
/// by descending frequency; equal counts are ordered by the packed bucket
/// color so the result is deterministic.
///
/// A fully transparent image yields an empty palette.
///
/// # Errors
///
/// [`ImageError::InvalidParameter`] if `max_colors`, `max_side` or
/// `sample_stride` is zero.
///
/// # Example
///
/// ```
/// use rasterkit_image::{ImageBuffer, ImageSize};
/// use rasterkit_imgproc::palette::extract_palette;
///
/// let image = ImageBuffer::from_size_val(ImageSize { width: 10, height: 10 }, [255, 0, 0, 255]).unwrap();
/// let palette = extract_palette(&image, 8).unwrap();
///
/// assert_eq!(palette.len(), 1);
/// assert_eq!(palette[0].hex, "#e00000");
/// assert_eq!(palette[0].frequency, 20);
/// ```
pub fn extract_palette_with(
    src: &ImageBuffer,
    config: &PaletteConfig,
) -> Result<Vec<ColorSwatch>, ImageError> {
    config.validate()?;

    let sample_size = downsample_size(src.size(), config.max_side);
    let resized;
    let sampled = if sample_size == src.size() {
        src
    } else {
        resized = resize_native(
            src,
            sample_size,
            InterpolationMode::Nearest,
            ExecutionStrategy::Serial,
        )?;
        &resized
    };

    let mut counts: HashMap<u32, u32> = HashMap::new();
    for px in sampled.pixels().step_by(config.sample_stride) {
        if px[3] < config.alpha_threshold {
            continue;
        }
        let rgb = Rgb::new(
            quantize_channel(px[0]),
            quantize_channel(px[1]),
            quantize_channel(px[2]),
        );
        *counts.entry(rgb.packed()).or_insert(0) += 1;
    }

    let mut buckets = counts.into_iter().collect::<Vec<_>>();
    buckets.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    log::trace!(
        "palette of {} sampled at {}: {} buckets",
        src.size(),
        sample_size,
        buckets.len()
    );

    Ok(buckets
        .into_iter()
        .take(config.max_colors)
        .map(|(key, frequency)| {
            let rgb = Rgb::new((key >> 16) as u8, (key >> 8) as u8, key as u8);
            ColorSwatch {
                hex: rgb.to_string(),
                rgb,
                frequency,
            }
        })
        .collect())
}
