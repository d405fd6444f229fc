//! Criterion micro-benchmarks for allocation, addressing, and release.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use strider_alloc::{DeviceBlock, DeviceMemEvenPitch};
use strider_bench::{device_with_pitch, field_line, field_plane, field_volume, reference_device};
use strider_test_utils::fixtures::plane_backend;

/// Benchmark: allocate + free a 100x100 f32 plane on the simulated device.
fn bench_plane_round_trip(c: &mut Criterion) {
    let dev = reference_device();
    c.bench_function("plane_round_trip_sim", |b| {
        b.iter(|| {
            let cursor = DeviceMemEvenPitch::<f32, 2>::allocate(&dev, field_plane()).unwrap();
            DeviceMemEvenPitch::<f32, 2>::deallocate(&dev, black_box(cursor)).unwrap();
        });
    });
}

/// Benchmark: allocate + free a 10K-element line on the simulated device.
fn bench_line_round_trip(c: &mut Criterion) {
    let dev = reference_device();
    c.bench_function("line_round_trip_sim", |b| {
        b.iter(|| {
            let cursor = DeviceMemEvenPitch::<f32, 1>::allocate(&dev, field_line()).unwrap();
            DeviceMemEvenPitch::<f32, 1>::deallocate(&dev, black_box(cursor)).unwrap();
        });
    });
}

/// Benchmark: scoped 64^3 volume with 512-byte pitch, freed on drop.
fn bench_volume_scoped(c: &mut Criterion) {
    let dev = device_with_pitch(512);
    c.bench_function("volume_scoped_sim", |b| {
        b.iter(|| {
            let block = DeviceBlock::<f32, 3, _>::allocate(&dev, field_volume()).unwrap();
            black_box(block.cursor());
        });
    });
}

/// Benchmark: allocator overhead alone, against the recording mock.
fn bench_plane_alloc_mock(c: &mut Criterion) {
    c.bench_function("plane_alloc_mock", |b| {
        b.iter_batched(
            plane_backend,
            |backend| {
                let cursor =
                    DeviceMemEvenPitch::<f32, 2>::allocate(&backend, field_plane()).unwrap();
                black_box(cursor);
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark: compute the address of every cell of a 100x100 plane.
fn bench_address_sweep(c: &mut Criterion) {
    let dev = reference_device();
    let cursor = DeviceMemEvenPitch::<f32, 2>::allocate(&dev, field_plane()).unwrap();
    c.bench_function("address_sweep_10k", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for j in 0..100 {
                for i in 0..100 {
                    acc ^= cursor.address([i, j]).unwrap().get();
                }
            }
            black_box(acc);
        });
    });
    DeviceMemEvenPitch::<f32, 2>::deallocate(&dev, cursor).unwrap();
}

criterion_group!(
    benches,
    bench_plane_round_trip,
    bench_line_round_trip,
    bench_volume_scoped,
    bench_plane_alloc_mock,
    bench_address_sweep
);
criterion_main!(benches);
