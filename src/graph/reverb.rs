use crate::{
    dsp::{mix::apply_dry_wet, reverb::Reverb},
    graph::node::{Automatable, GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Reverb Node
===========

The reverb hangs off the gated input on its own branch and goes straight
to the output; it is not part of the delay/distortion chain and is not
scaled by the master gain. Its blend is set by its own wet ratio:

  gated input ──┬────────────────────────┐
                └──→ [ Reverb (wet) ] ──→ (mix by wet) ──→ output

Parameters
----------

Decay (0.1 - 10 s):
  RT60 of the tail. The shoegaze presets sit between 5 and 9 seconds.

Pre-delay (0 - 1 s):
  Gap before the tail starts. A few tens of milliseconds keeps the pick
  attack clear of the wash.

Wet (0.0 - 1.0):
  0.0 = branch passes the input unchanged, 1.0 = tail only.
*/

#[derive(Clone, Copy, Debug)]
pub enum ReverbParam {
    /// RT60 in seconds
    Decay,
    /// Seconds before the tail begins
    PreDelay,
    /// Dry/wet blend of this branch
    Wet,
}

pub struct ReverbNode {
    reverb: Reverb,
    wet: f32,
    dry_buffer: Vec<f32>,
}

impl ReverbNode {
    pub fn new(decay: f32, pre_delay: f32, wet: f32, ctx: &RenderCtx) -> Self {
        Self {
            reverb: Reverb::new(ctx.sample_rate, decay, pre_delay),
            wet: wet.clamp(0.0, 1.0),
            dry_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl Automatable for ReverbNode {
    type Param = ReverbParam;

    fn param(&self, param: Self::Param) -> f32 {
        match param {
            ReverbParam::Decay => self.reverb.decay(),
            ReverbParam::PreDelay => self.reverb.pre_delay(),
            ReverbParam::Wet => self.wet,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32, _ctx: &RenderCtx) {
        match param {
            ReverbParam::Decay => self.reverb.set_decay(value),
            ReverbParam::PreDelay => self.reverb.set_pre_delay(value),
            ReverbParam::Wet => self.wet = value.clamp(0.0, 1.0),
        }
    }
}

impl GraphNode for ReverbNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        let dry = &mut self.dry_buffer[..out.len()];
        dry.copy_from_slice(out);

        for sample in out.iter_mut() {
            *sample = self.reverb.process(*sample);
        }

        apply_dry_wet(dry, out, self.wet);
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }
}
