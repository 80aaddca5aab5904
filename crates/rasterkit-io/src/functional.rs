use std::path::Path;

use rasterkit_image::ImageBuffer;

use crate::codec::{DefaultCodec, EncodeFormat, ImageCodec};
use crate::error::IoError;

/// Reads an image from the given file path as RGBA.
///
/// The method tries to read from any image format supported by the image crate.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGBA image containing the image data.
pub fn read_image_any_rgba8(file_path: impl AsRef<Path>) -> Result<ImageBuffer, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;
    let image = DefaultCodec.decode(&bytes)?;

    log::debug!("read {} from {}", image.size(), file_path.display());

    Ok(image)
}

/// Writes the image to the given file path.
///
/// # Arguments
///
/// * `file_path` - The destination file.
/// * `image` - The image to write.
/// * `format` - The encoding of the file.
/// * `quality` - JPEG quality in `[10, 100]`, ignored for PNG.
pub fn write_image(
    file_path: impl AsRef<Path>,
    image: &ImageBuffer,
    format: EncodeFormat,
    quality: u8,
) -> Result<(), IoError> {
    let bytes = DefaultCodec.encode(image, format, quality)?;
    std::fs::write(file_path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_file() {
        let res = read_image_any_rgba8("does/not/exist.png");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn write_read_png() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("image.png");

        let data = (0..6u8 * 4).flat_map(|v| [v, v * 2, v * 3, 255 - v]).collect();
        let image = ImageBuffer::new([6, 4].into(), data)?;

        write_image(&file_path, &image, EncodeFormat::from_path(&file_path)?, 90)?;
        assert_eq!(read_image_any_rgba8(&file_path)?, image);
        Ok(())
    }

    #[test]
    fn write_read_jpeg() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("image.jpg");

        let image = ImageBuffer::from_size_val([20, 10].into(), [30, 60, 90, 255])?;
        write_image(&file_path, &image, EncodeFormat::Jpeg, 90)?;

        let decoded = read_image_any_rgba8(&file_path)?;
        assert_eq!(decoded.size(), image.size());
        Ok(())
    }
}
