use criterion::{Criterion, criterion_group, criterion_main};
use screen_reveal::model::SceneBuilder;
use screen_reveal::{Director, ScenePackage};
use std::hint::black_box;

const DT: f32 = 1.0 / 60.0;

fn director() -> Director {
    ScenePackage::default().director().expect("default package")
}

fn bench_ticks(c: &mut Criterion) {
    c.bench_function("tick_intro", |b| {
        let mut d = director();
        d.on_input(800.0);
        b.iter(|| black_box(d.tick(black_box(DT))))
    });

    c.bench_function("tick_spiral", |b| {
        let mut d = director();
        d.on_input(6000.0);
        for _ in 0..600 {
            d.tick(DT);
        }
        d.on_input(500.0);
        b.iter(|| black_box(d.tick(black_box(DT))))
    });

    c.bench_function("build_blueprint", |b| {
        let package = ScenePackage::default();
        b.iter(|| black_box(SceneBuilder::new(&package.config).build().expect("blueprint")))
    });
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
