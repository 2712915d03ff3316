//! Benchmarks for the complete effect chain.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use shoegaze_fx::{
    dsp::distortion::synthesize,
    engine::{GraphEngine, GraphMessage},
    graph::SignalGraph,
    Param, ParameterStore,
};

use crate::BLOCK_SIZES;

fn guitar_like(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / 48_000.0;
            0.4 * (std::f32::consts::TAU * 196.0 * t).sin()
                + 0.2 * (std::f32::consts::TAU * 392.0 * t).sin()
        })
        .collect()
}

pub fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/graph");
    let params = ParameterStore::new();

    for &size in BLOCK_SIZES {
        let input = guitar_like(size);
        let mut output = vec![0.0f32; size];

        // Bare graph, default settings
        let curve = Arc::new(synthesize(params.get(Param::Distortion)));
        let mut graph = SignalGraph::new(48_000.0, &params, curve);
        group.bench_with_input(BenchmarkId::new("signal_graph", size), &size, |b, _| {
            b.iter(|| graph.process(black_box(&input), black_box(&mut output)))
        });

        // Engine with a parameter write per callback, as a UI sweep would
        let curve = Arc::new(synthesize(params.get(Param::Distortion)));
        let graph = SignalGraph::new(48_000.0, &params, curve);
        let (mut engine, mut handles) = GraphEngine::new(graph, 48_000);
        let mut cutoff = 200.0f32;
        group.bench_with_input(BenchmarkId::new("engine_sweep", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff >= 8000.0 { 200.0 } else { cutoff + 10.0 };
                let _ = handles
                    .control
                    .push(GraphMessage::Set(Param::FilterFreq, cutoff));
                engine.process(black_box(&input), black_box(&mut output));
                // Keep the taps from filling up
                while handles.monitor.pop().is_ok() {}
                while handles.analysis.pop().is_ok() {}
            })
        });
    }

    group.finish();
}
