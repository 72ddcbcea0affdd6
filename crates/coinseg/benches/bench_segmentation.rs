use coinseg::image::Image;
use coinseg::imgproc::draw::draw_filled_circle;
use coinseg::io::functional::read_image_any_rgb8;
use coinseg::segmentation::{sample_image_path, segment_coins, SegmentationParams};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

// a grid of dark discs on a bright background, used when the sample is missing
fn synthetic_coins() -> Image<u8, 3> {
    let mut image = Image::<u8, 3>::from_size_val([640, 480].into(), 220).unwrap();
    for row in 0..4 {
        for col in 0..6 {
            let center = (60 + col * 104, 60 + row * 116);
            draw_filled_circle(&mut image, center, 40, [50, 45, 40]);
        }
    }
    image
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Segmentation");

    let path = sample_image_path();
    let (name, image) = if path.exists() {
        ("water_coins", read_image_any_rgb8(&path).unwrap())
    } else {
        ("synthetic_coins", synthetic_coins())
    };

    let params = SegmentationParams::default();
    group.throughput(Throughput::Elements(image.size().area() as u64));
    group.bench_function(name, |b| {
        b.iter(|| std::hint::black_box(segment_coins(&image, &params).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_segmentation);
criterion_main!(benches);
