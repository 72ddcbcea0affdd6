use num_traits::Zero;
use std::cmp::PartialOrd;

use coinseg_image::{Image, ImageError};

use crate::parallel;

/// The type of thresholding to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdType {
    /// Binary thresholding
    Binary,
    /// Inverse binary thresholding
    BinaryInv,
}

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
///
/// # Examples
///
/// ```
/// use coinseg_image::{Image, ImageSize};
/// use coinseg_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // run the thresholding operation in parallel
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

/// Apply an inverse binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The value written where the input is not greater than the threshold.
///
/// # Examples
///
/// ```
/// use coinseg_image::{Image, ImageSize};
/// use coinseg_imgproc::threshold::threshold_binary_inverse;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary_inverse(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[255, 0, 255, 0, 0, 0]);
/// ```
pub fn threshold_binary_inverse<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // run the thresholding operation in parallel
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            T::zero()
        } else {
            max_value
        };
    });

    Ok(())
}

/// Compute Otsu's threshold level of a grayscale image.
///
/// The level maximizes the between-class variance of the two classes
/// `[0, level]` and `(level, 255]`. An image with a single intensity returns 0.
///
/// # Examples
///
/// ```
/// use coinseg_image::{Image, ImageSize};
/// use coinseg_imgproc::threshold::otsu_level;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 4, height: 1 },
///     vec![10, 12, 200, 210],
/// ).unwrap();
///
/// let level = otsu_level(&image);
/// assert!((12..200).contains(&level));
/// ```
pub fn otsu_level(src: &Image<u8, 1>) -> u8 {
    const BINS: usize = 256;
    let mut histogram = [0u32; BINS];

    // Compute histogram
    for &pixel in src.as_slice() {
        histogram[pixel as usize] += 1;
    }

    let total_pixels = src.as_slice().len() as f64;
    if total_pixels == 0.0 {
        return 0;
    }

    // Calculate total sum for mean computation
    let sum_total = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>();

    let mut best_variance = 0.0;
    let mut best_threshold = 0u8;

    // Initialize accumulators
    let mut weight_back = 0.0;
    let mut sum_back = 0.0;

    // Iterate through all possible thresholds
    for (current_threshold, &hist_count) in histogram.iter().enumerate() {
        // Update background class accumulators
        weight_back += hist_count as f64;
        sum_back += current_threshold as f64 * hist_count as f64;

        // Skip empty classes
        if weight_back == 0.0 || weight_back == total_pixels {
            continue;
        }

        // Calculate means for both classes
        let mean_back = sum_back / weight_back;
        let weight_fore = total_pixels - weight_back;
        let mean_fore = (sum_total - sum_back) / weight_fore;

        // Calculate between-class variance
        let variance = weight_back * weight_fore * (mean_back - mean_fore).powi(2);

        // Update best threshold if variance is higher
        if variance > best_variance {
            best_variance = variance;
            best_threshold = current_threshold as u8;
        }
    }

    best_threshold
}

/// Threshold a grayscale image, optionally choosing the level with Otsu's method.
///
/// When `otsu` is set the computed Otsu level replaces `threshold`, which is
/// then only kept as the fallback for callers that disable automatic selection.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output binary image.
/// * `threshold` - The fixed threshold used when `otsu` is false.
/// * `max_value` - The value written to pixels that pass the threshold.
/// * `thres_type` - The type of thresholding to apply.
/// * `otsu` - Whether to compute the level with Otsu's method.
///
/// # Returns
///
/// The threshold level that was applied.
///
/// # Examples
///
/// ```
/// use coinseg_image::{Image, ImageSize};
/// use coinseg_imgproc::threshold::{threshold, ThresholdType};
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// let level = threshold(&image, &mut thresholded, 100, 255, ThresholdType::BinaryInv, true).unwrap();
/// assert_eq!(level, 100);
/// assert_eq!(thresholded.as_slice(), &[255, 0, 255, 0, 0, 0]);
/// ```
pub fn threshold(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    threshold: u8,
    max_value: u8,
    thres_type: ThresholdType,
    otsu: bool,
) -> Result<u8, ImageError> {
    let level = if otsu { otsu_level(src) } else { threshold };

    match thres_type {
        ThresholdType::Binary => threshold_binary(src, dst, level, max_value)?,
        ThresholdType::BinaryInv => threshold_binary_inverse(src, dst, level, max_value)?,
    }

    Ok(level)
}
