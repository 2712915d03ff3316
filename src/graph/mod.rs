//! Composable building blocks for the effect's processing graph.
//!
//! Graph nodes wrap the low-level DSP primitives with what the live effect
//! needs: block-based in-place rendering and typed parameter writes.
//! `topology` wires them into the one fixed chain the effect runs.

/// Feedback delay line node.
pub mod delay;
/// Lowpass filter node for the wet path.
pub mod filter;
/// Static or ramped gain.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;
/// Reverb branch with its own wet ratio.
pub mod reverb;
/// The fixed effect wiring.
pub mod topology;
/// Table-lookup waveshaper with swappable curve.
pub mod waveshaper;

pub use node::{Automatable, GraphNode, RenderCtx};
pub use topology::SignalGraph;
