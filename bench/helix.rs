use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use glam::Vec3;
use screen_reveal::data::config::HelixConfig;
use screen_reveal::motion::helix::HelixLayout;
use std::hint::black_box;
use std::time::Duration;

fn bench_layout(c: &mut Criterion) {
    let layout = HelixLayout::from_config(&HelixConfig::default());
    let mut group = c.benchmark_group("helix");
    group.measurement_time(Duration::from_secs(2));
    for count in [8usize, 64, 512] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("layout", count), &count, |b, &count| {
            b.iter(|| black_box(layout.layout(count, black_box(count as f32 * 0.5))))
        });
        let slots = layout.layout(count, 0.0);
        let hover = vec![1.0; count];
        group.bench_with_input(BenchmarkId::new("pick", count), &count, |b, _| {
            b.iter(|| {
                black_box(layout.pick(
                    Vec3::new(0.0, 0.0, 3.6),
                    Vec3::NEG_Z,
                    black_box(&slots),
                    &hover,
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
