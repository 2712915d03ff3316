//! Real-world scenario benchmarks.
//!
//! The complete gated delay/fuzz/reverb chain, rendered the way a device
//! callback would drive it.

mod graph;

pub use graph::bench_graph;
