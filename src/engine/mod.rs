//! Audio-thread side of the effect.
//!
//! [`GraphEngine`] is moved into the device callback and owns the
//! [`SignalGraph`]. Everything else talks to it through lock-free rings:
//!
//! ```text
//!   GraphManager ──GraphMessage──→ ┌─────────────┐ ──raw input──→ gate loop
//!   gate loop ────GateCommand────→ │ GraphEngine │ ──gated input─→ visualizer
//!   GraphManager ←─retired curves─ └─────────────┘
//! ```
//!
//! Rings are drained at the top of every callback, so a write becomes audible
//! on the next processing quantum. Taps drop samples when their reader falls
//! behind; the callback never waits.

pub mod message;

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

pub use message::{GateCommand, GraphMessage};

use crate::{dsp::distortion::DistortionCurve, graph::SignalGraph, MAX_BLOCK_SIZE};

const CONTROL_QUEUE_SIZE: usize = 256;
const GATE_QUEUE_SIZE: usize = 64;
/// Every queued swap can be returned even if the control side skips a drain
const RETIRED_QUEUE_SIZE: usize = CONTROL_QUEUE_SIZE;

/// Control-side ends of the engine's rings.
pub struct EngineHandles {
    pub control: Producer<GraphMessage>,
    pub retired: Consumer<Arc<DistortionCurve>>,
    pub gate: Producer<GateCommand>,
    /// Raw (pre-gate) input, mono
    pub monitor: Consumer<f32>,
    /// Gated input, mono
    pub analysis: Consumer<f32>,
}

pub struct GraphEngine {
    graph: SignalGraph,
    control_rx: Consumer<GraphMessage>,
    gate_rx: Consumer<GateCommand>,
    retired_tx: Producer<Arc<DistortionCurve>>,
    monitor_tx: Producer<f32>,
    analysis_tx: Producer<f32>,
    /// Curves freed on this thread because the return ring was full
    dropped_curves: usize,
}

impl GraphEngine {
    /// Wrap `graph`, creating taps that hold up to `tap_capacity` samples.
    pub fn new(graph: SignalGraph, tap_capacity: usize) -> (Self, EngineHandles) {
        let (control_tx, control_rx) = RingBuffer::<GraphMessage>::new(CONTROL_QUEUE_SIZE);
        let (gate_tx, gate_rx) = RingBuffer::<GateCommand>::new(GATE_QUEUE_SIZE);
        let (retired_tx, retired_rx) = RingBuffer::new(RETIRED_QUEUE_SIZE);
        let (monitor_tx, monitor_rx) = RingBuffer::<f32>::new(tap_capacity.max(1));
        let (analysis_tx, analysis_rx) = RingBuffer::<f32>::new(tap_capacity.max(1));

        let engine = Self {
            graph,
            control_rx,
            gate_rx,
            retired_tx,
            monitor_tx,
            analysis_tx,
            dropped_curves: 0,
        };
        let handles = EngineHandles {
            control: control_tx,
            retired: retired_rx,
            gate: gate_tx,
            monitor: monitor_rx,
            analysis: analysis_rx,
        };

        (engine, handles)
    }

    pub fn sample_rate(&self) -> f32 {
        self.graph.ctx().sample_rate
    }

    pub fn graph(&self) -> &SignalGraph {
        &self.graph
    }

    /// Retired curves that could not be handed back and were freed here.
    pub fn dropped_curves(&self) -> usize {
        self.dropped_curves
    }

    /// Apply every pending control and gate message.
    fn drain_messages(&mut self) {
        while let Ok(msg) = self.control_rx.pop() {
            match msg {
                GraphMessage::Set(param, value) => self.graph.apply(param, value),
                GraphMessage::SwapCurve(curve) => {
                    let retired = self.graph.swap_curve(curve);
                    // Full only once the control side stops draining. The
                    // table is then freed here, so count it
                    if self.retired_tx.push(retired).is_err() {
                        self.dropped_curves += 1;
                    }
                }
            }
        }

        while let Ok(cmd) = self.gate_rx.pop() {
            self.graph.ramp_gate(cmd.target, cmd.ramp_secs);
        }
    }

    /// Process one callback's worth of mono audio.
    ///
    /// `input` and `output` must be the same length; any length is accepted
    /// and rendered in sub-blocks of at most `MAX_BLOCK_SIZE`.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        self.drain_messages();

        for (inp, out) in input
            .chunks(MAX_BLOCK_SIZE)
            .zip(output.chunks_mut(MAX_BLOCK_SIZE))
        {
            self.graph.process(inp, out);
            push_tap(&mut self.monitor_tx, inp);
            push_tap(&mut self.analysis_tx, self.graph.gated(inp.len()));
        }
    }
}

/// Push as much of `samples` as fits, dropping the rest.
fn push_tap(tx: &mut Producer<f32>, samples: &[f32]) {
    let n = tx.slots().min(samples.len());
    if n == 0 {
        return;
    }
    if let Ok(chunk) = tx.write_chunk_uninit(n) {
        chunk.fill_from_iter(samples.iter().copied());
    }
}
