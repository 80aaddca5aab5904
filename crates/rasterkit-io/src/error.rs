/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to decode the image bytes.
    #[error("Failed to decode the image. {0}")]
    Decode(#[source] image::ImageError),

    /// Error to encode the image.
    #[error("Failed to encode the image. {0}")]
    Encode(#[source] image::ImageError),

    /// Encode quality outside `[10, 100]`.
    #[error("Invalid encode quality {0}")]
    InvalidQuality(u8),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] rasterkit_image::ImageError),
}
