//! Benchmarks for DSP primitives and the full effect graph.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (curve, delay, filter, reverb)
//!   - scenarios/*  The wired signal graph and its engine wrapper

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    dsp::bench_distortion,
    dsp::bench_delay,
    dsp::bench_filter,
    dsp::bench_reverb,
    scenarios::bench_graph,
);
criterion_main!(benches);
