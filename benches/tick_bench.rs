use arena_melee::{EngagementConfig, EngagementWorld};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

fn engaged_world(count: usize, parallel_threshold: usize) -> EngagementWorld {
    let config = EngagementConfig {
        parallel_threshold,
        ..Default::default()
    };
    let mut world = EngagementWorld::new(config);
    world.set_target(Some(Vec3::ZERO));
    for i in 0..count {
        let angle = i as f32 * std::f32::consts::TAU / count as f32;
        let radius = 4.0 + (i % 5) as f32;
        let id = world.spawn(Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius));
        world.begin_combat(id).ok();
    }
    world
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engagement_tick");
    for &count in &[16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, &count| {
            let mut world = engaged_world(count, usize::MAX);
            b.iter(|| black_box(world.tick(1.0 / 60.0)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", count), &count, |b, &count| {
            let mut world = engaged_world(count, 1);
            b.iter(|| black_box(world.tick(1.0 / 60.0)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
