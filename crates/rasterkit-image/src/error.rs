/// An error type for the image module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image has no pixels.
    #[error("Image size {0}x{1} has zero area")]
    ZeroArea(u32, u32),

    /// Error when two images that must match in size do not.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    InvalidImageSize(u32, u32, u32, u32),

    /// Error when a crop region is empty or exceeds the source bounds.
    #[error("Region (x: {x}, y: {y}, width: {width}, height: {height}) is not inside a {bounds_width}x{bounds_height} image")]
    InvalidRegion {
        /// Left edge of the region.
        x: u32,
        /// Top edge of the region.
        y: u32,
        /// Width of the region.
        width: u32,
        /// Height of the region.
        height: u32,
        /// Width of the source image.
        bounds_width: u32,
        /// Height of the source image.
        bounds_height: u32,
    },

    /// Error when a resize target has a zero dimension.
    #[error("Invalid target dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),

    /// Error reported by the resampling backend.
    #[error("Failed to resize the image. {0}")]
    ResizeFailed(String),

    /// Error when a parameter is outside its allowed range.
    #[error("Parameter `{name}` has invalid value {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value, formatted.
        value: String,
    },

    /// Error when a color string cannot be parsed.
    #[error("Invalid color string: {0:?}")]
    InvalidColor(String),

    /// Error when a selection operation is not valid in the current state.
    #[error("Selection operation `{0}` is not valid in the current state")]
    InvalidSelectionState(&'static str),
}

impl ImageError {
    /// Shorthand for [`ImageError::InvalidParameter`].
    pub fn invalid_parameter(name: &'static str, value: impl ToString) -> Self {
        ImageError::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}
