/// An error type for the segmentation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SegmentationError {
    /// An image operation failed.
    #[error(transparent)]
    Image(#[from] coinseg_image::ImageError),

    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] coinseg_io::IoError),

    /// The parameters file could not be parsed.
    #[error("Failed to parse the segmentation parameters. {0}")]
    InvalidParams(#[from] serde_json::Error),
}

impl From<std::io::Error> for SegmentationError {
    fn from(err: std::io::Error) -> Self {
        SegmentationError::Io(coinseg_io::IoError::FileError(err))
    }
}
