use rasterkit_image::{GrayPlane, ImageBuffer, ImageError, ImageSize, Rgb, CHANNELS};
use serde::{Deserialize, Serialize};

use crate::crop::CropRegion;
use crate::filter::to_u8;
use crate::font::BitmapFont;

/// Horizontal margin of the corner anchors, in pixels.
pub const ANCHOR_MARGIN: f32 = 20.0;
/// Smallest accepted font size.
pub const MIN_FONT_SIZE: u32 = 12;
/// Largest accepted font size.
pub const MAX_FONT_SIZE: u32 = 200;

/// Measures the rendered width of a text.
pub trait TextMeasure {
    /// Width in pixels of `text` at `font_size_px`.
    fn measure_text(&self, text: &str, font_size_px: f32) -> f32;
}

/// Rasterizes a text into a coverage mask.
///
/// The mask is tightly fitted: it is centered on the anchor point as a whole.
pub trait GlyphRasterizer {
    /// Size of the mask [`GlyphRasterizer::rasterize`] would produce.
    fn mask_size(&self, text: &str, font_size_px: f32) -> Result<ImageSize, ImageError>;

    /// Coverage of `text` at `font_size_px`, `0` empty to `255` fully covered.
    fn rasterize(&self, text: &str, font_size_px: f32) -> Result<GrayPlane, ImageError>;

    /// Coverage of `window`, given in mask coordinates, of the full mask.
    ///
    /// The default rasterizes the whole text and copies the window out.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidRegion`] if the window is not inside the mask.
    fn rasterize_window(
        &self,
        text: &str,
        font_size_px: f32,
        window: CropRegion,
    ) -> Result<GrayPlane, ImageError> {
        let full = self.rasterize(text, font_size_px)?;
        window.validate(full.size())?;

        let (x, width) = (window.x as usize, window.width as usize);
        let data = full
            .as_slice()
            .chunks_exact(full.cols())
            .skip(window.y as usize)
            .take(window.height as usize)
            .flat_map(|row| &row[x..x + width])
            .copied()
            .collect();
        GrayPlane::new(window.size(), data)
    }
}

/// Where a watermark is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Centered on the image.
    Center,
    /// Top left corner.
    TopLeft,
    /// Top right corner.
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom right corner.
    #[default]
    BottomRight,
}

/// A text watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSpec {
    /// The text to draw.
    pub text: String,
    /// Font size in pixels, `[12, 200]`.
    pub font_size_px: u32,
    /// Text color as a hex string.
    pub color_hex: String,
    /// Opacity of the text, `[0, 1]`.
    pub opacity: f32,
    /// Placement of the text.
    pub anchor: Anchor,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size_px: 48,
            color_hex: "#ffffff".to_string(),
            opacity: 0.5,
            anchor: Anchor::default(),
        }
    }
}

impl WatermarkSpec {
    /// A watermark with the given text and default styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Check the parameters and return the parsed color.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidParameter`] naming `font_size_px`, `opacity` or
    /// `color_hex`.
    pub fn validate(&self) -> Result<Rgb, ImageError> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size_px) {
            return Err(ImageError::invalid_parameter(
                "font_size_px",
                self.font_size_px,
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ImageError::invalid_parameter("opacity", self.opacity));
        }
        self.color_hex
            .parse::<Rgb>()
            .map_err(|_| ImageError::invalid_parameter("color_hex", &self.color_hex))
    }

    /// Anchor point of the text center for an image of `width x height`.
    pub fn anchor_point(&self, width: u32, height: u32, text_width: f32) -> (f32, f32) {
        let (w, h) = (width as f32, height as f32);
        let left = ANCHOR_MARGIN + text_width / 2.0;
        let right = w - ANCHOR_MARGIN - text_width / 2.0;
        let top = self.font_size_px as f32;
        let bottom = h - top;

        match self.anchor {
            Anchor::Center => (w / 2.0, h / 2.0),
            Anchor::TopLeft => (left, top),
            Anchor::TopRight => (right, top),
            Anchor::BottomLeft => (left, bottom),
            Anchor::BottomRight => (right, bottom),
        }
    }
}

/// Draw a watermark with the built-in [`BitmapFont`].
pub fn apply_watermark_default(
    src: &ImageBuffer,
    spec: &WatermarkSpec,
) -> Result<ImageBuffer, ImageError> {
    apply_watermark(src, spec, &BitmapFont, &BitmapFont)
}

/// Draw a text watermark over an image.
///
/// The coverage mask is centered on the anchor point and blended pixel by
/// pixel with `a = coverage * opacity`; color channels become
/// `c * (1 - a) + color * a` and alpha becomes `a * 255 + alpha * (1 - a)`.
/// Only the part of the mask that lands on the image is rasterized.
///
/// An empty text or a zero opacity returns an exact copy of the source.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `spec` - The watermark parameters.
/// * `measure` - Provides the text width used by the corner anchors.
/// * `rasterizer` - Provides the glyph coverage.
///
/// # Errors
///
/// [`ImageError::InvalidParameter`] if the spec does not validate, and any
/// error of the rasterizer, such as a text too long to measure.
///
/// # Example
///
/// ```
/// use rasterkit_image::{ImageBuffer, ImageSize};
/// use rasterkit_imgproc::watermark::{apply_watermark_default, Anchor, WatermarkSpec};
///
/// let white = ImageBuffer::from_size_val(ImageSize { width: 100, height: 100 }, [255; 4]).unwrap();
/// let spec = WatermarkSpec {
///     anchor: Anchor::Center,
///     opacity: 1.0,
///     color_hex: "#000000".into(),
///     ..WatermarkSpec::new("X")
/// };
///
/// let out = apply_watermark_default(&white, &spec).unwrap();
/// assert_eq!(out.get_pixel(50, 50), Some([0, 0, 0, 255]));
/// assert_eq!(out.get_pixel(1, 1), Some([255, 255, 255, 255]));
/// ```
pub fn apply_watermark(
    src: &ImageBuffer,
    spec: &WatermarkSpec,
    measure: &dyn TextMeasure,
    rasterizer: &dyn GlyphRasterizer,
) -> Result<ImageBuffer, ImageError> {
    let color = spec.validate()?;

    if spec.text.is_empty() || spec.opacity == 0.0 {
        return Ok(src.clone());
    }

    let font_size = spec.font_size_px as f32;
    let text_width = measure.measure_text(&spec.text, font_size);
    let (cx, cy) = spec.anchor_point(src.width(), src.height(), text_width);
    let full = rasterizer.mask_size(&spec.text, font_size)?;

    let left = (cx - full.width as f32 / 2.0).round() as i64;
    let top = (cy - full.height as f32 / 2.0).round() as i64;

    // part of the mask that lands on the image, in image coordinates
    let (cols, rows) = (src.cols() as i64, src.rows() as i64);
    let (x0, x1) = (left.max(0), (left + full.width as i64).min(cols));
    let (y0, y1) = (top.max(0), (top + full.height as i64).min(rows));

    log::trace!(
        "watermark of {} bytes at ({}, {}) on {}",
        spec.text.len(),
        left,
        top,
        src.size()
    );

    if x0 >= x1 || y0 >= y1 {
        return Ok(src.clone());
    }

    let window = CropRegion {
        x: (x0 - left) as u32,
        y: (y0 - top) as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    };
    let mask = rasterizer.rasterize_window(&spec.text, font_size, window)?;
    if mask.size() != window.size() {
        return Err(ImageError::InvalidImageSize(
            mask.size().width,
            mask.size().height,
            window.width,
            window.height,
        ));
    }

    let mut dst = src.clone();
    let stride = src.row_stride();
    let color = color.to_array().map(|c| c as f32);
    let data = dst.as_slice_mut();

    for (my, mask_row) in mask.as_slice().chunks_exact(mask.cols()).enumerate() {
        let row = (y0 as usize + my) * stride;
        for (mx, &coverage) in mask_row.iter().enumerate() {
            if coverage == 0 {
                continue;
            }

            let a = coverage as f32 / 255.0 * spec.opacity;
            let idx = row + (x0 as usize + mx) * CHANNELS;
            let px = &mut data[idx..idx + CHANNELS];
            for (c, &target) in px.iter_mut().zip(&color) {
                *c = to_u8(*c as f32 * (1.0 - a) + target * a);
            }
            px[3] = to_u8(a * 255.0 + px[3] as f32 * (1.0 - a));
        }
    }

    Ok(dst)
}
