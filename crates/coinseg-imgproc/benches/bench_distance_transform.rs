use coinseg_image::{Image, ImageSize};
use coinseg_imgproc::distance_transform::{
    distance_transform, DistanceMask, DistanceTransformExecutor,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn create_mask(width: usize, height: usize) -> Image<u8, 1> {
    // foreground everywhere except a sparse diagonal of seeds
    let mut data = vec![255u8; width * height];
    for i in 0..width.min(height) {
        if i % 10 == 0 {
            data[i * width + i] = 0;
        }
    }
    Image::new(ImageSize { width, height }, data).unwrap()
}

fn bench_distance_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("DistanceTransform");

    for (width, height) in [(256, 256), (512, 512), (1024, 1024)].iter() {
        group.throughput(Throughput::Elements((*width * *height) as u64));
        let parameter_string = format!("{width}x{height}");

        let image = create_mask(*width, *height);
        let mut dst = Image::<f32, 1>::from_size_val(image.size(), 0.0).unwrap();

        for mask in [DistanceMask::Chamfer3, DistanceMask::Chamfer5] {
            group.bench_with_input(
                BenchmarkId::new(format!("{mask:?}").to_lowercase(), &parameter_string),
                &image,
                |b, i| b.iter(|| std::hint::black_box(distance_transform(i, &mut dst, mask))),
            );
        }

        group.bench_with_input(
            BenchmarkId::new("precise", &parameter_string),
            &image,
            |b, i| {
                let mut executor = DistanceTransformExecutor::new();
                b.iter(|| std::hint::black_box(executor.execute(i, &mut dst)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_distance_transform);
criterion_main!(benches);
