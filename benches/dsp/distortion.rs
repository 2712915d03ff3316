//! Benchmarks for curve synthesis and waveshaper lookup.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shoegaze_fx::dsp::distortion::synthesize;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    // Full table rebuild, paid on every drive change
    for &drive in &[0.0f32, 400.0, 800.0] {
        group.bench_with_input(
            BenchmarkId::new("synthesize", drive as u32),
            &drive,
            |b, &drive| b.iter(|| synthesize(black_box(drive))),
        );
    }

    let curve = synthesize(400.0);
    for &size in BLOCK_SIZES {
        // Full-scale sine so every part of the table is hit
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("shape", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                curve.shape_buffer(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
