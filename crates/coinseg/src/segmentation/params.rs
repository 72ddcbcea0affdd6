use std::path::Path;

use coinseg_image::ImageError;
use coinseg_imgproc::distance_transform::DistanceMask;
use coinseg_imgproc::morphology::{Kernel, KernelShape};
use serde::{Deserialize, Serialize};

use crate::error::SegmentationError;

/// Tunable constants of the coin segmentation pipeline.
///
/// The defaults are the calibration the sample image was tuned with. Any
/// field missing from a JSON file keeps its default value.
///
/// # Example
///
/// ```
/// use coinseg::segmentation::SegmentationParams;
///
/// let params: SegmentationParams = serde_json::from_str(r#"{ "open_iterations": 1 }"#).unwrap();
/// assert_eq!(params.open_iterations, 1);
/// assert_eq!(params.base_threshold, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    /// Cutoff used when Otsu's method is disabled.
    pub base_threshold: u8,
    /// Value written to foreground pixels of the binary mask.
    pub max_value: u8,
    /// Pick the cutoff automatically with Otsu's method.
    pub use_otsu: bool,
    /// Side of the square structuring element.
    pub kernel_size: usize,
    /// Erosions and dilations applied by the opening.
    pub open_iterations: usize,
    /// Dilations estimating the sure background.
    pub background_dilate_iterations: usize,
    /// Fraction of the maximum distance above which a pixel is sure foreground.
    pub foreground_ratio: f32,
    /// Metric of the distance transform.
    pub distance_mask: DistanceMask,
    /// Color of the drawn contours.
    pub contour_color: [u8; 3],
    /// Thickness of the drawn contours.
    pub contour_thickness: usize,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            base_threshold: 100,
            max_value: 255,
            use_otsu: true,
            kernel_size: 3,
            open_iterations: 2,
            background_dilate_iterations: 3,
            foreground_ratio: 0.7,
            distance_mask: DistanceMask::Chamfer5,
            contour_color: [0, 255, 0],
            contour_thickness: 2,
        }
    }
}

impl SegmentationParams {
    /// Load the parameters from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SegmentationError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let params = serde_json::from_str(&contents)?;
        log::debug!("loaded segmentation parameters from {:?}", path.as_ref());
        Ok(params)
    }

    /// Build the square structuring element used by the morphology steps.
    pub fn kernel(&self) -> Result<Kernel, ImageError> {
        Kernel::new(KernelShape::Box {
            size: self.kernel_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calibration() {
        let params = SegmentationParams::default();
        assert_eq!(params.base_threshold, 100);
        assert!(params.use_otsu);
        assert_eq!(params.open_iterations, 2);
        assert_eq!(params.background_dilate_iterations, 3);
        assert_eq!(params.distance_mask, DistanceMask::Chamfer5);
        assert_eq!(params.contour_color, [0, 255, 0]);
    }

    #[test]
    fn json_round_trip_file() -> Result<(), SegmentationError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("params.json");

        let params = SegmentationParams {
            foreground_ratio: 0.5,
            distance_mask: DistanceMask::Precise,
            ..Default::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&params)?)?;

        assert_eq!(SegmentationParams::from_json_file(&path)?, params);

        Ok(())
    }

    #[test]
    fn invalid_json() -> Result<(), SegmentationError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("params.json");
        std::fs::write(&path, "{ not json")?;

        let res = SegmentationParams::from_json_file(&path);
        assert!(matches!(res, Err(SegmentationError::InvalidParams(_))));

        Ok(())
    }

    #[test]
    fn even_kernel_rejected() {
        let params = SegmentationParams {
            kernel_size: 4,
            ..Default::default()
        };
        assert!(params.kernel().is_err());
    }
}
