mod params;

pub use params::SegmentationParams;

use std::path::{Path, PathBuf};

use coinseg_image::{Image, ImageError};
use coinseg_imgproc::{
    color,
    contours::{self, Contour, ContourApproximation, RetrievalMode},
    distance_transform::{self, distance_transform},
    draw,
    morphology::{self, BorderMode},
    threshold::{self, ThresholdType},
};
use coinseg_io::png;

use crate::error::SegmentationError;

/// Location of the bundled sample image.
pub const SAMPLE_IMAGE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../tests/data/water_coins.jpg"
);

/// Number of regions the default parameters find in the sample image.
pub const EXPECTED_SAMPLE_REGIONS: usize = 24;

/// Path to the bundled sample image.
pub fn sample_image_path() -> PathBuf {
    PathBuf::from(SAMPLE_IMAGE_PATH)
}

/// The output of the pipeline.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Copy of the input with every contour drawn on it.
    pub annotated: Image<u8, 3>,
    /// External contours of the sure foreground, in discovery order.
    pub contours: Vec<Contour>,
    /// Enclosed area of each contour, same order as `contours`.
    pub areas: Vec<f64>,
}

impl Segmentation {
    /// Number of detected regions.
    pub fn num_regions(&self) -> usize {
        self.contours.len()
    }
}

/// Intermediate images of one pipeline run.
#[derive(Debug, Clone)]
pub struct SegmentationStages {
    /// Single channel intensity.
    pub gray: Image<u8, 1>,
    /// Inverted binary mask after thresholding.
    pub binary: Image<u8, 1>,
    /// Binary mask after the morphological opening.
    pub opened: Image<u8, 1>,
    /// Dilated opening, everything outside is sure background.
    pub sure_background: Image<u8, 1>,
    /// Distance of every opened pixel to the background.
    pub distance: Image<f32, 1>,
    /// Pixels far enough from the background to be sure foreground.
    pub sure_foreground: Image<u8, 1>,
    /// Threshold level applied to the intensity.
    pub threshold_level: u8,
    /// Largest value of the distance map.
    pub max_distance: f32,
}

impl SegmentationStages {
    /// Write every stage as a PNG file into `dir`.
    ///
    /// The distance map is rescaled to the full 8-bit range.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<(), SegmentationError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        png::write_image_png_gray8(dir.join("gray.png"), &self.gray)?;
        png::write_image_png_gray8(dir.join("binary.png"), &self.binary)?;
        png::write_image_png_gray8(dir.join("opened.png"), &self.opened)?;
        png::write_image_png_gray8(dir.join("sure_background.png"), &self.sure_background)?;
        png::write_image_png_gray8(dir.join("distance.png"), &self.distance_u8()?)?;
        png::write_image_png_gray8(dir.join("sure_foreground.png"), &self.sure_foreground)?;

        log::info!("wrote segmentation stages to {dir:?}");
        Ok(())
    }

    fn distance_u8(&self) -> Result<Image<u8, 1>, ImageError> {
        let scale = if self.max_distance > 0.0 {
            255.0 / self.max_distance
        } else {
            0.0
        };
        let data = self
            .distance
            .as_slice()
            .iter()
            .map(|&d| (d * scale).round().clamp(0.0, 255.0) as u8)
            .collect();
        Image::new(self.distance.size(), data)
    }
}

/// Segment the coins of an RGB image.
///
/// Runs the full pipeline and returns the annotated copy of the input, the
/// external contours of the sure foreground and their areas.
///
/// # Errors
///
/// Fails when the parameters describe an invalid structuring element.
///
/// # Example
///
/// ```
/// use coinseg::image::Image;
/// use coinseg::segmentation::{segment_coins, SegmentationParams};
///
/// let image = Image::<u8, 3>::from_size_val([64, 48].into(), 220).unwrap();
/// let segmentation = segment_coins(&image, &SegmentationParams::default()).unwrap();
/// assert_eq!(segmentation.num_regions(), 0);
/// ```
pub fn segment_coins(
    image: &Image<u8, 3>,
    params: &SegmentationParams,
) -> Result<Segmentation, SegmentationError> {
    let (segmentation, _) = segment_coins_with_stages(image, params)?;
    Ok(segmentation)
}

/// Segment the coins of an RGB image and keep the intermediate images.
pub fn segment_coins_with_stages(
    image: &Image<u8, 3>,
    params: &SegmentationParams,
) -> Result<(Segmentation, SegmentationStages), SegmentationError> {
    let size = image.size();
    let kernel = params.kernel()?;

    // intensity
    let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
    color::gray_from_rgb_u8(image, &mut gray)?;

    // objects are darker than the background
    let mut binary = Image::<u8, 1>::from_size_val(size, 0)?;
    let threshold_level = threshold::threshold(
        &gray,
        &mut binary,
        params.base_threshold,
        params.max_value,
        ThresholdType::BinaryInv,
        params.use_otsu,
    )?;
    log::debug!("threshold level: {threshold_level}");

    // remove speckle
    let mut opened = Image::<u8, 1>::from_size_val(size, 0)?;
    morphology::open(
        &binary,
        &mut opened,
        &kernel,
        params.open_iterations,
        BorderMode::Ignore,
    )?;

    let mut sure_background = Image::<u8, 1>::from_size_val(size, 0)?;
    morphology::dilate(
        &opened,
        &mut sure_background,
        &kernel,
        params.background_dilate_iterations,
        BorderMode::Ignore,
    )?;

    let mut distance = Image::<f32, 1>::from_size_val(size, 0.0)?;
    distance_transform(&opened, &mut distance, params.distance_mask)?;
    let (_, max_distance) = distance_transform::min_max(&distance);
    log::debug!("maximum distance: {max_distance}");

    // keep the cores far from any background pixel
    let mut core = Image::<f32, 1>::from_size_val(size, 0.0)?;
    threshold::threshold_binary(
        &distance,
        &mut core,
        params.foreground_ratio * max_distance,
        params.max_value as f32,
    )?;
    let sure_foreground = core.cast::<u8>()?;

    let contours = contours::find_contours(
        &sure_foreground,
        RetrievalMode::External,
        ContourApproximation::Simple,
    );
    let areas = contours.iter().map(Contour::area).collect::<Vec<_>>();
    log::debug!("found {} regions", contours.len());

    let mut annotated = image.clone();
    draw::draw_contours(
        &mut annotated,
        &contours,
        params.contour_color,
        params.contour_thickness,
    );

    let segmentation = Segmentation {
        annotated,
        contours,
        areas,
    };

    let stages = SegmentationStages {
        gray,
        binary,
        opened,
        sure_background,
        distance,
        sure_foreground,
        threshold_level,
        max_distance,
    };

    Ok((segmentation, stages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinseg_image::ImageSize;

    #[test]
    fn stages_are_consistent() -> Result<(), SegmentationError> {
        let mut image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 60,
                height: 60,
            },
            230,
        )?;
        draw::draw_filled_circle(&mut image, (30, 30), 15, [40, 40, 40]);

        let (segmentation, stages) =
            segment_coins_with_stages(&image, &SegmentationParams::default())?;

        assert_eq!(stages.threshold_level, 40);
        assert_eq!(stages.binary.get_pixel(30, 30, 0)?, 255);
        assert_eq!(stages.binary.get_pixel(0, 0, 0)?, 0);

        // the background estimate covers the opened mask
        for (&o, &b) in stages.opened.as_slice().iter().zip(stages.sure_background.as_slice()) {
            assert!(o <= b);
        }

        assert!(stages.max_distance > 10.0);
        assert_eq!(stages.sure_foreground.get_pixel(30, 30, 0)?, 255);
        assert_eq!(segmentation.num_regions(), 1);

        Ok(())
    }

    #[test]
    fn write_stages() -> Result<(), SegmentationError> {
        let mut image = Image::<u8, 3>::from_size_val([40, 30].into(), 200)?;
        draw::draw_filled_circle(&mut image, (20, 15), 8, [10, 10, 10]);

        let (_, stages) = segment_coins_with_stages(&image, &SegmentationParams::default())?;

        let tmp_dir = tempfile::tempdir()?;
        let out_dir = tmp_dir.path().join("stages");
        stages.write_to_dir(&out_dir)?;

        for name in [
            "gray.png",
            "binary.png",
            "opened.png",
            "sure_background.png",
            "distance.png",
            "sure_foreground.png",
        ] {
            assert!(out_dir.join(name).exists(), "missing {name}");
        }

        Ok(())
    }

    #[test]
    fn invalid_kernel() -> Result<(), SegmentationError> {
        let image = Image::<u8, 3>::from_size_val([8, 8].into(), 0)?;
        let params = SegmentationParams {
            kernel_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            segment_coins(&image, &params),
            Err(SegmentationError::Image(ImageError::InvalidKernelSize(_, _)))
        ));
        Ok(())
    }
}
