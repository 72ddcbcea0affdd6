use argh::FromArgs;
use std::path::PathBuf;
use std::time::Instant;

use coinseg::{
    io::{functional as F, jpeg},
    segmentation::{
        sample_image_path, segment_coins, segment_coins_with_stages, SegmentationParams,
        EXPECTED_SAMPLE_REGIONS,
    },
};

mod stats;
mod viewer;
use stats::RunStatistics;

#[derive(FromArgs)]
/// Segment the coins of an image and time repeated runs of the pipeline
struct Args {
    /// path to an input image (default: the bundled sample)
    #[argh(option, short = 'i')]
    image_path: Option<PathBuf>,

    /// number of timed runs (default: 1000)
    #[argh(option, short = 'n', default = "1000")]
    num_runs: usize,

    /// optional JSON file overriding the segmentation parameters
    #[argh(option, short = 'p')]
    params: Option<PathBuf>,

    /// optional path to write the annotated image to (jpeg)
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// optional directory to write the intermediate stages to
    #[argh(option)]
    debug_dir: Option<PathBuf>,

    /// show the annotated image and the stages in a rerun viewer
    #[argh(switch)]
    show: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let params = match &args.params {
        Some(path) => SegmentationParams::from_json_file(path)?,
        None => SegmentationParams::default(),
    };

    let is_sample = args.image_path.is_none();
    let image_path = args.image_path.unwrap_or_else(sample_image_path);

    // read the image once, only the pipeline is timed
    let image = F::read_image_any_rgb8(&image_path)?;
    log::info!("loaded {:?} with size {}", image_path, image.size());

    let mut timings = Vec::with_capacity(args.num_runs);
    let mut segmentation = None;
    for _ in 0..args.num_runs {
        let start = Instant::now();
        let result = segment_coins(&image, &params)?;
        timings.push(start.elapsed().as_secs_f64() * 1e6);
        segmentation = Some(result);
    }

    let stats = RunStatistics::from_samples(&timings);
    println!("runs: {}", timings.len());
    println!("min:  {:.1} us", stats.min);
    println!("max:  {:.1} us", stats.max);
    println!("mean: {:.1} us", stats.mean);
    println!("std:  {:.1} us", stats.std_dev);

    let segmentation = match segmentation {
        Some(segmentation) => segmentation,
        None => segment_coins(&image, &params)?,
    };

    println!("regions: {}", segmentation.num_regions());
    for (i, area) in segmentation.areas.iter().enumerate() {
        println!("  #{i:>2} area {area:.1}");
    }

    if is_sample && segmentation.num_regions() != EXPECTED_SAMPLE_REGIONS {
        log::warn!(
            "expected {} regions in the sample image, found {}",
            EXPECTED_SAMPLE_REGIONS,
            segmentation.num_regions()
        );
    }

    if let Some(output) = &args.output {
        jpeg::write_image_jpeg_rgb8(output, &segmentation.annotated, 95)?;
        log::info!("annotated image written to {output:?}");
    }

    // stages are recomputed outside of the timed loop
    let stages = if args.show || args.debug_dir.is_some() {
        Some(segment_coins_with_stages(&image, &params)?.1)
    } else {
        None
    };

    if let (Some(debug_dir), Some(stages)) = (&args.debug_dir, &stages) {
        stages.write_to_dir(debug_dir)?;
    }

    if args.show {
        let rec = rerun::RecordingStreamBuilder::new("Coin Segmentation").spawn()?;
        viewer::log_segmentation(&rec, &segmentation, stages.as_ref())?;
    }

    Ok(())
}
