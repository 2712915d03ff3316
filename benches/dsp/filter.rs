//! Benchmarks for the lowpass filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shoegaze_fx::{dsp::filter::SVFilter, graph::RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for &cutoff in &[200.0f32, 4000.0, 8000.0] {
            let mut filter = SVFilter::lowpass(cutoff);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("lowpass_{}hz", cutoff as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        filter.render(black_box(&mut buffer), black_box(&ctx));
                    })
                },
            );
        }
    }

    group.finish();
}
