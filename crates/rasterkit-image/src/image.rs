use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// Number of interleaved channels in an [`ImageBuffer`] (RGBA).
pub const CHANNELS: usize = 4;

/// Image size in pixels
///
/// # Examples
///
/// ```
/// use rasterkit_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// assert_eq!(image_size.num_pixels(), 200);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the size covers no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Length of the longer side.
    pub fn longer_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[u32; 2]> for ImageSize {
    fn from(size: [u32; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width, size.height]
    }
}

fn check_size(size: ImageSize, data_len: usize, channels: usize) -> Result<(), ImageError> {
    if size.is_empty() {
        return Err(ImageError::ZeroArea(size.width, size.height));
    }

    let expected = size.num_pixels() * channels;
    if data_len != expected {
        return Err(ImageError::InvalidChannelShape(data_len, expected));
    }

    Ok(())
}

/// A decoded RGBA raster, row-major with straight alpha.
///
/// The buffer always holds exactly `width * height * 4` bytes and never has
/// zero area. Transforms take a `&ImageBuffer` and return a fresh one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageBuffer {
    size: ImageSize,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The RGBA pixel data of the image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ZeroArea`] for an empty size and
    /// [`ImageError::InvalidChannelShape`] if the data length does not match.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterkit_image::{ImageBuffer, ImageSize};
    ///
    /// let image = ImageBuffer::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 4],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<u8>) -> Result<Self, ImageError> {
        check_size(size, data.len(), CHANNELS)?;
        Ok(Self { size, data })
    }

    /// Create a new image filled with a single RGBA value.
    pub fn from_size_val(size: ImageSize, val: [u8; 4]) -> Result<Self, ImageError> {
        if size.is_empty() {
            return Err(ImageError::ZeroArea(size.width, size.height));
        }

        let data = val.as_slice().repeat(size.num_pixels());
        Self::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width as usize
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height as usize
    }

    /// Number of bytes in one row.
    pub fn row_stride(&self) -> usize {
        self.cols() * CHANNELS
    }

    /// The raw RGBA bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The raw RGBA bytes, mutably. The length can not change.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the image and return its RGBA bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Get the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.cols() + x as usize) * CHANNELS;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[idx..idx + CHANNELS]);
        Some(px)
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// Returns `false` and leaves the image untouched when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: [u8; 4]) -> bool {
        if x >= self.size.width || y >= self.size.height {
            return false;
        }
        let idx = (y as usize * self.cols() + x as usize) * CHANNELS;
        self.data[idx..idx + CHANNELS].copy_from_slice(&val);
        true
    }

    /// Iterate over the pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }
}

/// A single channel 8-bit plane, used for intermediate layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayPlane {
    size: ImageSize,
    data: Vec<u8>,
}

impl GrayPlane {
    /// Create a new plane from its values.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ImageBuffer::new`] with one channel.
    pub fn new(size: ImageSize, data: Vec<u8>) -> Result<Self, ImageError> {
        check_size(size, data.len(), 1)?;
        Ok(Self { size, data })
    }

    /// Create a plane filled with `val`.
    pub fn from_size_val(size: ImageSize, val: u8) -> Result<Self, ImageError> {
        Self::new(size, vec![val; size.num_pixels()])
    }

    /// Get the size of the plane in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the plane.
    pub fn cols(&self) -> usize {
        self.size.width as usize
    }

    /// Get the number of rows of the plane.
    pub fn rows(&self) -> usize {
        self.size.height as usize
    }

    /// The plane values.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The plane values, mutably.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Value at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(self.data[y as usize * self.cols() + x as usize])
    }

    /// Expand the plane to an opaque RGBA image with the value in R, G and B.
    pub fn to_rgba(&self) -> ImageBuffer {
        let data = self
            .data
            .iter()
            .flat_map(|&v| [v, v, v, 255])
            .collect::<Vec<_>>();
        ImageBuffer {
            size: self.size,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.longer_side(), 20);
        assert_eq!(<[u32; 2]>::from(image_size), [10, 20]);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = ImageBuffer::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 4],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.row_stride(), 40);
        assert_eq!(image.pixels().count(), 200);
        Ok(())
    }

    #[test]
    fn image_rejects_bad_length() {
        let res = ImageBuffer::new([2, 2].into(), vec![0u8; 15]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(15, 16)));
    }

    #[test]
    fn image_rejects_zero_area() {
        let res = ImageBuffer::new([0, 3].into(), vec![]);
        assert_eq!(res, Err(ImageError::ZeroArea(0, 3)));

        let res = ImageBuffer::from_size_val([4, 0].into(), [0, 0, 0, 255]);
        assert_eq!(res, Err(ImageError::ZeroArea(4, 0)));
    }

    #[test]
    fn image_get_set_pixel() -> Result<(), ImageError> {
        let mut image = ImageBuffer::from_size_val([3, 2].into(), [1, 2, 3, 4])?;
        assert_eq!(image.get_pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(image.get_pixel(3, 0), None);

        assert!(image.set_pixel(1, 1, [9, 9, 9, 9]));
        assert!(!image.set_pixel(1, 2, [9, 9, 9, 9]));
        assert_eq!(image.get_pixel(1, 1), Some([9, 9, 9, 9]));
        assert_eq!(&image.as_slice()[16..20], &[9, 9, 9, 9]);
        Ok(())
    }

    #[test]
    fn gray_plane_to_rgba() -> Result<(), ImageError> {
        let plane = GrayPlane::new([2, 1].into(), vec![10, 200])?;
        assert_eq!(plane.get(1, 0), Some(200));
        let rgba = plane.to_rgba();
        assert_eq!(rgba.as_slice(), &[10, 10, 10, 255, 200, 200, 200, 255]);
        Ok(())
    }
}
