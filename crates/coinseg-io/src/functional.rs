use std::path::Path;

use coinseg_image::{Image, ImageSize};

use crate::error::IoError;
use crate::jpeg::read_image_jpeg_rgb8;

/// Reads an image of any supported format as rgb8.
///
/// JPEG files are decoded with the dedicated decoder, every other format
/// goes through the `image` crate and is converted to three channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB image with three channels (rgb8).
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let is_jpeg = file_path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg")
    });
    if is_jpeg {
        return read_image_jpeg_rgb8(&file_path);
    }

    let img = image::open(&file_path)?.into_rgb8();
    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_raw())?)
}
