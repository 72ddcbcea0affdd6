use std::path::PathBuf;

/// Errors raised while reading or writing images.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// The input path does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// The file extension does not match the requested codec.
    #[error("Unsupported file extension: {0}")]
    InvalidFileExtension(PathBuf),

    /// Filesystem access failed.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// The JPEG stream could not be decoded.
    #[error("Error with Jpeg decoding. {0}")]
    JpegDecodingError(#[from] zune_jpeg::errors::DecodeErrors),

    /// The JPEG stream could not be encoded.
    #[error("Error with Jpeg encoding. {0}")]
    JpegEncodingError(#[from] jpeg_encoder::EncodingError),

    /// The decoded buffer does not fit the image size.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] coinseg_image::ImageError),

    /// A non-JPEG file could not be decoded.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// The PNG stream could not be encoded.
    #[error("Failed to encode the png image. {0}")]
    PngEncodingError(String),
}
