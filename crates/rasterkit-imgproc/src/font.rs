use font8x8::{UnicodeFonts, BASIC_FONTS};
use rasterkit_image::{GrayPlane, ImageError, ImageSize};

use crate::crop::CropRegion;
use crate::watermark::{GlyphRasterizer, TextMeasure};

/// Side of a font8x8 glyph cell.
const GLYPH_CELL: u32 = 8;

/// Built-in 8x8 bitmap font, scaled up with nearest neighbor.
///
/// Each glyph is `8 * scale` pixels square with `scale = max(1, round(size / 8))`
/// and glyphs are separated by a gap of `scale` pixels. Characters outside the
/// basic Latin set render as `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    /// Pixel scale of the glyph cells for a font size.
    pub fn scale(font_size_px: f32) -> u32 {
        ((font_size_px / GLYPH_CELL as f32).round() as u32).max(1)
    }

    fn glyph(ch: char) -> [u8; 8] {
        BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }

    fn text_size(text: &str, font_size_px: f32) -> Result<ImageSize, ImageError> {
        let scale = Self::scale(font_size_px);
        let glyphs = text.chars().count();
        let too_large = || ImageError::invalid_parameter("text", format!("{glyphs} characters"));

        let advance = (GLYPH_CELL + 1).checked_mul(scale).ok_or_else(too_large)?;
        // the last glyph has no trailing gap
        let width = u32::try_from(glyphs)
            .ok()
            .and_then(|n| n.checked_mul(advance))
            .ok_or_else(too_large)?
            .saturating_sub(scale);
        let height = GLYPH_CELL.checked_mul(scale).ok_or_else(too_large)?;

        Ok(ImageSize { width, height })
    }
}

impl TextMeasure for BitmapFont {
    fn measure_text(&self, text: &str, font_size_px: f32) -> f32 {
        let scale = Self::scale(font_size_px) as f32;
        match text.chars().count() {
            0 => 0.0,
            n => n as f32 * (GLYPH_CELL as f32 + 1.0) * scale - scale,
        }
    }
}

impl GlyphRasterizer for BitmapFont {
    fn mask_size(&self, text: &str, font_size_px: f32) -> Result<ImageSize, ImageError> {
        Self::text_size(text, font_size_px)
    }

    fn rasterize(&self, text: &str, font_size_px: f32) -> Result<GrayPlane, ImageError> {
        let size = Self::text_size(text, font_size_px)?;
        let full = CropRegion {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        };
        self.rasterize_window(text, font_size_px, full)
    }

    /// Only the glyphs that overlap `window` are drawn.
    fn rasterize_window(
        &self,
        text: &str,
        font_size_px: f32,
        window: CropRegion,
    ) -> Result<GrayPlane, ImageError> {
        window.validate(Self::text_size(text, font_size_px)?)?;

        let scale = Self::scale(font_size_px) as usize;
        let advance = (GLYPH_CELL as usize + 1) * scale;
        let (wx0, wy0) = (window.x as usize, window.y as usize);
        let wx1 = wx0 + window.width as usize;
        let wy1 = wy0 + window.height as usize;

        let mut mask = GrayPlane::from_size_val(window.size(), 0)?;
        let cols = mask.cols();
        let data = mask.as_slice_mut();

        for (i, ch) in text.chars().enumerate().skip(wx0 / advance) {
            let origin = i * advance;
            if origin >= wx1 {
                break;
            }
            for (row, bits) in Self::glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_CELL as usize {
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    // one font pixel, clipped to the window
                    let x0 = (origin + col * scale).max(wx0);
                    let x1 = (origin + (col + 1) * scale).min(wx1);
                    if x0 >= x1 {
                        continue;
                    }
                    for y in (row * scale).max(wy0)..((row + 1) * scale).min(wy1) {
                        let offset = (y - wy0) * cols + (x0 - wx0);
                        data[offset..offset + (x1 - x0)].fill(255);
                    }
                }
            }
        }

        Ok(mask)
    }
}
