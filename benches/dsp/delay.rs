//! Benchmarks for the feedback delay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shoegaze_fx::{
    dsp::delay::DelayLine,
    graph::{delay::FeedbackDelayNode, GraphNode, RenderCtx},
};

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let ctx = RenderCtx::new(48_000.0);

    // Delay times in seconds, shortest to the longest the effect allows
    let delay_times: &[f32] = &[0.01, 0.2, 1.0];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_time in delay_times {
            let mut node = FeedbackDelayNode::new(delay_time, 0.5, 1.0, &ctx);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("feedback_{}ms", (delay_time * 1000.0) as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        node.render_block(black_box(&mut buffer), black_box(&ctx));
                    })
                },
            );
        }

        // Fractional read on its own
        let mut line = DelayLine::with_max_time(1.0, 48_000.0);
        for &sample in &input {
            line.write(sample);
        }
        group.bench_with_input(BenchmarkId::new("read_interpolated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for i in 0..size {
                    sum += line.read_interpolated(black_box(100.5 + i as f32 * 0.01));
                }
                sum
            })
        });
    }

    group.finish();
}
