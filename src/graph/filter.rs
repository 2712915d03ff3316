use crate::{
    dsp::filter::SVFilter,
    graph::node::{Automatable, GraphNode, RenderCtx},
};

/*
Lowpass Filter Node
===================

Sits between the delay and the waveshaper on the wet path. Lowering the
cutoff darkens the echo train and tames the upper harmonics before they are
distorted; raising it lets more fizz through.

Cutoff (Hz):
  200 Hz:   Muffled, like through a wall
  1000 Hz:  Warm, round
  4000 Hz:  Present but smooth (default)
  8000 Hz:  Bright, close to bypass for guitar
*/

#[derive(Clone, Copy, Debug)]
pub enum FilterParam {
    Cutoff,
}

pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        FilterNode {
            filter: SVFilter::lowpass(cutoff_hz),
        }
    }
}

impl Automatable for FilterNode {
    type Param = FilterParam;

    fn param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.filter.cutoff_hz,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32, _ctx: &RenderCtx) {
        match param {
            FilterParam::Cutoff => self.filter.set_cutoff(value),
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::analysis::rms;
    use std::f32::consts::TAU;

    fn sine_rms_through(node: &mut FilterNode, freq: f32) -> f32 {
        let ctx = RenderCtx::new(48_000.0);
        let mut buffer: Vec<f32> = (0..4800)
            .map(|i| (TAU * freq * i as f32 / 48_000.0).sin())
            .collect();
        node.reset();
        node.render_block(&mut buffer, &ctx);
        // Skip the settling time
        rms(&buffer[2400..])
    }

    #[test]
    fn test_cutoff_write_changes_response() {
        let ctx = RenderCtx::new(48_000.0);
        let mut node = FilterNode::lowpass(8000.0);
        let open = sine_rms_through(&mut node, 3000.0);

        node.set_param(FilterParam::Cutoff, 200.0, &ctx);
        assert_eq!(node.param(FilterParam::Cutoff), 200.0);
        let closed = sine_rms_through(&mut node, 3000.0);

        assert!(open > 0.6, "open rms {open}");
        assert!(closed < 0.05, "closed rms {closed}");
    }
}
