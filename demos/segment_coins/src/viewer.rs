use coinseg::image::Image;
use coinseg::segmentation::{Segmentation, SegmentationStages};

fn log_gray(
    rec: &rerun::RecordingStream,
    name: &str,
    img: &Image<u8, 1>,
) -> Result<(), rerun::RecordingStreamError> {
    rec.log(
        name,
        &rerun::Image::from_elements(img.as_slice(), img.size().into(), rerun::ColorModel::L),
    )
}

/// Log the annotated image and, when given, every intermediate stage.
pub fn log_segmentation(
    rec: &rerun::RecordingStream,
    segmentation: &Segmentation,
    stages: Option<&SegmentationStages>,
) -> Result<(), rerun::RecordingStreamError> {
    let annotated = &segmentation.annotated;
    rec.log(
        "annotated",
        &rerun::Image::from_elements(
            annotated.as_slice(),
            annotated.size().into(),
            rerun::ColorModel::RGB,
        ),
    )?;

    let Some(stages) = stages else {
        return Ok(());
    };

    log_gray(rec, "stages/gray", &stages.gray)?;
    log_gray(rec, "stages/binary", &stages.binary)?;
    log_gray(rec, "stages/opened", &stages.opened)?;
    log_gray(rec, "stages/sure_background", &stages.sure_background)?;
    rec.log(
        "stages/distance",
        &rerun::Image::from_elements(
            stages.distance.as_slice(),
            stages.distance.size().into(),
            rerun::ColorModel::L,
        ),
    )?;
    log_gray(rec, "stages/sure_foreground", &stages.sure_foreground)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinseg::imgproc::draw::draw_filled_circle;
    use coinseg::segmentation::{segment_coins_with_stages, SegmentationParams};

    #[test]
    fn log_to_memory_sink() -> Result<(), Box<dyn std::error::Error>> {
        let mut image = Image::<u8, 3>::from_size_val([48, 48].into(), 220)?;
        draw_filled_circle(&mut image, (24, 24), 12, [30, 30, 30]);
        let (segmentation, stages) =
            segment_coins_with_stages(&image, &SegmentationParams::default())?;

        let (rec, storage) = rerun::RecordingStreamBuilder::new("segment_coins_test").memory()?;
        log_segmentation(&rec, &segmentation, Some(&stages))?;
        log_segmentation(&rec, &segmentation, None)?;
        rec.flush_blocking();

        assert!(!storage.take().is_empty());

        Ok(())
    }
}
