use super::kernels::Kernel;
use coinseg_image::{Image, ImageError};
use rayon::prelude::*;

/// Border handling for morphological operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode<T> {
    /// Out-of-image neighbors are skipped, so the border never shrinks or
    /// grows a region on its own.
    #[default]
    Ignore,

    /// Out-of-image neighbors take a constant value.
    Constant(T),
}

#[derive(Clone, Copy)]
enum Reduce {
    Min,
    Max,
}

fn check_sizes<T, const C: usize>(
    src: &Image<T, C>,
    dst: &Image<T, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }
    Ok(())
}

// one pass of a min/max filter over the kernel neighborhood
fn reduce_once<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    offsets: &[(isize, isize)],
    border: BorderMode<T>,
    reduce: Reduce,
) where
    T: Copy + Send + Sync + Ord,
{
    let width = src.width();
    let height = src.height() as isize;
    if width == 0 {
        return;
    }
    let src_slice = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(width * C)
        .enumerate()
        .for_each(|(y, row_chunk)| {
            for x in 0..width {
                for c in 0..C {
                    let mut acc = src_slice[(y * width + x) * C + c];

                    for &(dx, dy) in offsets {
                        let px = x as isize + dx;
                        let py = y as isize + dy;
                        let value = if px < 0 || py < 0 || px >= width as isize || py >= height {
                            match border {
                                BorderMode::Ignore => continue,
                                BorderMode::Constant(v) => v,
                            }
                        } else {
                            src_slice[(py as usize * width + px as usize) * C + c]
                        };

                        acc = match reduce {
                            Reduce::Min => acc.min(value),
                            Reduce::Max => acc.max(value),
                        };
                    }

                    row_chunk[x * C + c] = acc;
                }
            }
        });
}

fn reduce_iter<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode<T>,
    reduce: Reduce,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + Ord,
{
    check_sizes(src, dst)?;

    if iterations == 0 {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let offsets = kernel.offsets();
    reduce_once(src, dst, &offsets, border, reduce);

    if iterations > 1 {
        let mut scratch = dst.clone();
        for _ in 1..iterations {
            reduce_once(dst, &mut scratch, &offsets, border, reduce);
            std::mem::swap(dst, &mut scratch);
        }
    }

    Ok(())
}

/// Dilate an image using a [`Kernel`].
///
/// Dilation expands white regions in the image. Each pixel is replaced
/// by the maximum value in the neighborhood defined by the kernel.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `iterations` - Number of times the dilation is applied.
/// * `border` - The border handling mode ([`BorderMode`]).
///
/// # Returns
///
/// Ok(()) on success, or [`ImageError`] if shapes don't match.
pub fn dilate<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode<T>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + Ord,
{
    reduce_iter(src, dst, kernel, iterations, border, Reduce::Max)
}

/// Erode an image using a [`Kernel`].
///
/// Erosion shrinks white regions in the image. Each pixel is replaced
/// by the minimum value in the neighborhood defined by the kernel.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `iterations` - Number of times the erosion is applied.
/// * `border` - The border handling mode ([`BorderMode`]).
///
/// # Returns
///
/// Ok(()) on success, or [`ImageError`] if shapes don't match.
pub fn erode<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode<T>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + Ord,
{
    reduce_iter(src, dst, kernel, iterations, border, Reduce::Min)
}

/// Opening: erosion followed by dilation.
///
/// Removes small objects and smooths object boundaries. With `iterations = n`
/// the image is eroded `n` times and then dilated `n` times.
pub fn open<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode<T>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + Ord,
{
    check_sizes(src, dst)?;
    let mut temp_img = src.clone();
    erode(src, &mut temp_img, kernel, iterations, border)?;
    dilate(&temp_img, dst, kernel, iterations, border)?;
    Ok(())
}

/// Closing: dilation followed by erosion.
///
/// Fills small holes and smooths object boundaries. With `iterations = n`
/// the image is dilated `n` times and then eroded `n` times.
pub fn close<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode<T>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + Ord,
{
    check_sizes(src, dst)?;
    let mut temp_img = src.clone();
    dilate(src, &mut temp_img, kernel, iterations, border)?;
    erode(&temp_img, dst, kernel, iterations, border)?;
    Ok(())
}
