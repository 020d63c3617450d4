use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scene::{BakeSettings, EnvironmentBaker, HdrImage};

fn gradient_panorama(width: u32, height: u32) -> HdrImage {
    let data = (0..height)
        .flat_map(|y| {
            (0..width).flat_map(move |x| {
                let sky = 1.0 - y as f32 / height as f32;
                [sky * 4.0, sky * 2.0, x as f32 / width as f32]
            })
        })
        .collect();
    HdrImage::new(width, height, data).expect("panorama size")
}

fn bench_bake(c: &mut Criterion) {
    let source = gradient_panorama(1024, 512);
    c.bench_function("bake 1024x512 default sizes", |b| {
        b.iter(|| {
            let baker = EnvironmentBaker::new(BakeSettings::default());
            black_box(baker.bake(source.clone()))
        })
    });
}

criterion_group!(benches, bench_bake);
criterion_main!(benches);
