use crate::{
    dsp::ramp::LinearRamp,
    graph::node::{GraphNode, RenderCtx},
};

/*
Gain Node
=========

Scales the signal by a gain that can either jump or glide.

  set_gain(v)            The next sample is multiplied by v. Used for the
                         dry level and the master level, where the control
                         surface already moves in small steps.

  ramp_to(v, seconds)    The gain moves linearly to v over the given time.
                         Used by the noise gate, whose open/close must never
                         be a step.

Unity is 1.0; the graph runs the dry path above unity (2.0 by default) and
relies on the master gain to bring the sum back down.
*/

pub struct GainNode {
    gain: LinearRamp,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: LinearRamp::new(gain),
        }
    }

    /// Jump to `gain` on the next sample.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain.set_immediate(gain);
    }

    /// Glide to `target`, arriving after `ramp_secs`.
    pub fn ramp_to(&mut self, target: f32, ramp_secs: f32, ctx: &RenderCtx) {
        self.gain.ramp_to(target, ramp_secs, ctx);
    }

    /// Gain applied to the most recent sample.
    pub fn gain(&self) -> f32 {
        self.gain.value()
    }

    /// Gain the node is heading to (equal to `gain()` when not ramping).
    pub fn target(&self) -> f32 {
        self.gain.target()
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        if !self.gain.is_ramping() {
            let gain = self.gain.value();
            for sample in out.iter_mut() {
                *sample *= gain;
            }
            return;
        }

        for sample in out.iter_mut() {
            *sample *= self.gain.next_sample();
        }
    }
}
