use std::path::Path;

use image::{
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
    ExtendedColorType, ImageEncoder,
};
use rasterkit_image::{ImageBuffer, ImageSize};

use crate::error::IoError;

/// Lowest accepted JPEG quality.
pub const MIN_QUALITY: u8 = 10;
/// Highest accepted JPEG quality.
pub const MAX_QUALITY: u8 = 100;

/// Output formats supported by [`ImageCodec::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodeFormat {
    /// Lossless PNG, keeps alpha.
    Png,
    /// Lossy JPEG, drops alpha.
    Jpeg,
}

impl EncodeFormat {
    /// Pick the format from a file extension, case insensitive.
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidFileExtension`] for anything but `png`, `jpg` or `jpeg`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("png") => Ok(EncodeFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(EncodeFormat::Jpeg),
            _ => Err(IoError::InvalidFileExtension(path.to_path_buf())),
        }
    }
}

/// Converts between encoded bytes and [`ImageBuffer`]s.
pub trait ImageCodec {
    /// Decode PNG, JPEG or WebP bytes into an RGBA image.
    fn decode(&self, bytes: &[u8]) -> Result<ImageBuffer, IoError>;

    /// Encode an image. `quality` only applies to JPEG.
    fn encode(&self, image: &ImageBuffer, format: EncodeFormat, quality: u8)
        -> Result<Vec<u8>, IoError>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl ImageCodec for DefaultCodec {
    fn decode(&self, bytes: &[u8]) -> Result<ImageBuffer, IoError> {
        let img = image::load_from_memory(bytes).map_err(IoError::Decode)?;

        let size = ImageSize {
            width: img.width(),
            height: img.height(),
        };

        Ok(ImageBuffer::new(size, img.into_rgba8().into_raw())?)
    }

    fn encode(
        &self,
        image: &ImageBuffer,
        format: EncodeFormat,
        quality: u8,
    ) -> Result<Vec<u8>, IoError> {
        let mut buffer = Vec::new();

        match format {
            EncodeFormat::Png => {
                PngEncoder::new(&mut buffer)
                    .write_image(
                        image.as_slice(),
                        image.width(),
                        image.height(),
                        ExtendedColorType::Rgba8,
                    )
                    .map_err(IoError::Encode)?;
            }
            EncodeFormat::Jpeg => {
                if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
                    return Err(IoError::InvalidQuality(quality));
                }
                let rgb = image
                    .pixels()
                    .flat_map(|p| [p[0], p[1], p[2]])
                    .collect::<Vec<_>>();
                JpegEncoder::new_with_quality(&mut buffer, quality)
                    .write_image(&rgb, image.width(), image.height(), ExtendedColorType::Rgb8)
                    .map_err(IoError::Encode)?;
            }
        }

        log::debug!(
            "encoded {} as {:?} into {} bytes",
            image.size(),
            format,
            buffer.len()
        );

        Ok(buffer)
    }
}
