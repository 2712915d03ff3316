use std::sync::Arc;

use crate::{
    dsp::{distortion::DistortionCurve, mix::sum_in_place},
    graph::{
        delay::{DelayParam, FeedbackDelayNode},
        filter::{FilterNode, FilterParam},
        gain::GainNode,
        node::{Automatable, GraphNode, RenderCtx},
        reverb::{ReverbNode, ReverbParam},
        waveshaper::WaveShaperNode,
    },
    params::{Param, ParameterStore},
    MAX_BLOCK_SIZE,
};

/*
Signal Graph
============

The whole effect is one fixed wiring, built once per session:

                       ┌──→ [ Dry gain ] ───────────────────────────────┐
                       │                                                 ▼
  input ──→ [ Gate ] ──┼──→ [ Delay ⟲ feedback ] → [ Lowpass ] → [ Shaper ] → (+) → [ Master ] ──→ (+) ──→ output
                       │                                                                          ▲
                       └──→ [ Reverb (own wet) ] ─────────────────────────────────────────────────┘

  Gate        Input gain driven by the noise gate. Always ramped.
  Dry gain    Level of the clean signal into the mixer (2.0 by default).
  Delay       Echo train; its output feeds the filter, not the mixer.
  Lowpass     Darkens the echoes before distortion.
  Shaper      Waveshaper using the current distortion curve.
  Master      Output level of the summed dry and distorted paths.
  Reverb      Separate branch off the gated input, blended by its own wet
              ratio and summed after the master gain.

`process` renders one block of at most MAX_BLOCK_SIZE samples. Every branch
works on its own scratch copy of the gated input so the nodes can keep
processing in place.
*/

pub struct SignalGraph {
    ctx: RenderCtx,
    gate: GainNode,
    dry: GainNode,
    delay: FeedbackDelayNode,
    filter: FilterNode,
    shaper: WaveShaperNode,
    master: GainNode,
    reverb: ReverbNode,
    gated_buffer: Vec<f32>,
    wet_buffer: Vec<f32>,
    reverb_buffer: Vec<f32>,
}

impl SignalGraph {
    /// Wire the graph with the values in `params` and the given curve.
    pub fn new(sample_rate: f32, params: &ParameterStore, curve: Arc<DistortionCurve>) -> Self {
        let ctx = RenderCtx::new(sample_rate);
        let max_delay = Param::DelayTime.range().max;

        Self {
            ctx,
            gate: GainNode::new(1.0),
            dry: GainNode::new(params.get(Param::DryGain)),
            delay: FeedbackDelayNode::new(
                params.get(Param::DelayTime),
                params.get(Param::Feedback),
                max_delay,
                &ctx,
            ),
            filter: FilterNode::lowpass(params.get(Param::FilterFreq)),
            shaper: WaveShaperNode::new(curve),
            master: GainNode::new(params.get(Param::OutputGain)),
            reverb: ReverbNode::new(
                params.get(Param::ReverbDecay),
                params.get(Param::PreDelay),
                params.get(Param::ReverbWet),
                &ctx,
            ),
            gated_buffer: vec![0.0; MAX_BLOCK_SIZE],
            wet_buffer: vec![0.0; MAX_BLOCK_SIZE],
            reverb_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn ctx(&self) -> &RenderCtx {
        &self.ctx
    }

    /// Write one parameter straight into its node.
    ///
    /// Distortion is not handled here: a drive change needs a new curve,
    /// which arrives through [`SignalGraph::swap_curve`].
    pub fn apply(&mut self, param: Param, value: f32) {
        let ctx = self.ctx;
        match param {
            Param::DelayTime => self.delay.set_param(DelayParam::Time, value, &ctx),
            Param::Feedback => self.delay.set_param(DelayParam::Feedback, value, &ctx),
            Param::ReverbDecay => self.reverb.set_param(ReverbParam::Decay, value, &ctx),
            Param::PreDelay => self.reverb.set_param(ReverbParam::PreDelay, value, &ctx),
            Param::ReverbWet => self.reverb.set_param(ReverbParam::Wet, value, &ctx),
            Param::FilterFreq => self.filter.set_param(FilterParam::Cutoff, value, &ctx),
            Param::OutputGain => self.master.set_gain(value),
            Param::DryGain => self.dry.set_gain(value),
            Param::Distortion => {}
        }
    }

    /// Current value held by the node behind `param`.
    pub fn value(&self, param: Param) -> f32 {
        match param {
            Param::DelayTime => self.delay.param(DelayParam::Time),
            Param::Feedback => self.delay.param(DelayParam::Feedback),
            Param::ReverbDecay => self.reverb.param(ReverbParam::Decay),
            Param::PreDelay => self.reverb.param(ReverbParam::PreDelay),
            Param::ReverbWet => self.reverb.param(ReverbParam::Wet),
            Param::FilterFreq => self.filter.param(FilterParam::Cutoff),
            Param::Distortion => self.shaper.curve().drive(),
            Param::OutputGain => self.master.target(),
            Param::DryGain => self.dry.target(),
        }
    }

    /// Install a new waveshaper curve, returning the retired one.
    pub fn swap_curve(&mut self, curve: Arc<DistortionCurve>) -> Arc<DistortionCurve> {
        self.shaper.swap_curve(curve)
    }

    /// Glide the input gate toward `target`.
    pub fn ramp_gate(&mut self, target: f32, ramp_secs: f32) {
        let ctx = self.ctx;
        self.gate.ramp_to(target, ramp_secs, &ctx);
    }

    /// Input gain applied to the most recent sample.
    pub fn gate_gain(&self) -> f32 {
        self.gate.gain()
    }

    /// The gated input of the last processed block.
    pub fn gated(&self, len: usize) -> &[f32] {
        &self.gated_buffer[..len.min(MAX_BLOCK_SIZE)]
    }

    /// Render one block. `input` and `output` must have the same length,
    /// at most `MAX_BLOCK_SIZE`.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        debug_assert!(input.len() <= MAX_BLOCK_SIZE);
        let len = input.len();
        let ctx = self.ctx;

        let gated = &mut self.gated_buffer[..len];
        gated.copy_from_slice(input);
        self.gate.render_block(gated, &ctx);

        // Dry path straight into the output buffer, which doubles as the mixer
        output.copy_from_slice(gated);
        self.dry.render_block(output, &ctx);

        let wet = &mut self.wet_buffer[..len];
        wet.copy_from_slice(gated);
        self.delay.render_block(wet, &ctx);
        self.filter.render_block(wet, &ctx);
        self.shaper.render_block(wet, &ctx);

        sum_in_place(output, wet);
        self.master.render_block(output, &ctx);

        let verb = &mut self.reverb_buffer[..len];
        verb.copy_from_slice(gated);
        self.reverb.render_block(verb, &ctx);
        sum_in_place(output, verb);
    }

    /// Clear all node history (echo train, filter state, reverb tail).
    pub fn reset(&mut self) {
        self.delay.reset();
        self.filter.reset();
        self.reverb.reset();
    }
}
