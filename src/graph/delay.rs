use crate::{
    dsp::delay::DelayLine,
    graph::node::{Automatable, GraphNode, RenderCtx},
};

/*
Feedback Delay
==============

A delay line whose output is attenuated and written back into its own
input, producing a train of echoes that die away.

  Input ──→ (+) ──→ [ Delay ] ──┬──→ Output
             ↑                  │
             └─── × feedback ←──┘

Per sample:

    delayed = line[n - delay]
    line[n] = input + feedback × delayed
    output  = delayed

Each trip around the loop multiplies the echo by `feedback`, so the n-th
repeat has amplitude `feedback^n`. With feedback below 1.0 the train always
dies out; at 1.0 or above it would ring forever or grow, which is why the
feedback parameter tops out at 0.9.

Delay time is read with linear interpolation, so sweeping it while audio is
running glides the pitch of the echoes instead of stepping.
*/

#[derive(Clone, Copy, Debug)]
pub enum DelayParam {
    /// Delay time in seconds
    Time,
    /// Loop gain, kept below 1.0
    Feedback,
}

/// Absolute ceiling on loop gain, whatever the caller passes.
const MAX_FEEDBACK: f32 = 0.99;

pub struct FeedbackDelayNode {
    line: DelayLine,
    delay_time: f32,
    delay_samples: f32,
    feedback: f32,
}

impl FeedbackDelayNode {
    /// Build a delay able to reach `max_time` seconds at `ctx.sample_rate`.
    pub fn new(delay_time: f32, feedback: f32, max_time: f32, ctx: &RenderCtx) -> Self {
        let mut node = Self {
            line: DelayLine::with_max_time(max_time, ctx.sample_rate),
            delay_time: 0.0,
            delay_samples: 1.0,
            feedback: 0.0,
        };
        node.set_param(DelayParam::Time, delay_time, ctx);
        node.set_param(DelayParam::Feedback, feedback, ctx);
        node
    }

    #[inline]
    fn next_sample(&mut self, input: f32) -> f32 {
        let delayed = self.line.read_interpolated(self.delay_samples);
        self.line.write(input + self.feedback * delayed);
        delayed
    }
}

impl Automatable for FeedbackDelayNode {
    type Param = DelayParam;

    fn param(&self, param: Self::Param) -> f32 {
        match param {
            DelayParam::Time => self.delay_time,
            DelayParam::Feedback => self.feedback,
        }
    }

    fn set_param(&mut self, param: Self::Param, value: f32, ctx: &RenderCtx) {
        match param {
            DelayParam::Time => {
                self.delay_time = value.max(0.0);
                self.delay_samples = ctx
                    .seconds_to_samples(self.delay_time)
                    .clamp(1.0, self.line.capacity() as f32);
            }
            DelayParam::Feedback => {
                self.feedback = value.clamp(-MAX_FEEDBACK, MAX_FEEDBACK);
            }
        }
    }
}

impl GraphNode for FeedbackDelayNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn impulse_response(delay_time: f32, feedback: f32, len: usize) -> Vec<f32> {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut node = FeedbackDelayNode::new(delay_time, feedback, 1.0, &ctx);
        let mut buffer = vec![0.0; len];
        buffer[0] = 1.0;
        node.render_block(&mut buffer, &ctx);
        buffer
    }

    #[test]
    fn test_echoes_decay_geometrically() {
        // 62.5 ms = exactly 3000 samples
        let out = impulse_response(0.0625, 0.5, 10_000);

        assert_eq!(out[0], 0.0);
        assert_eq!(out[3000], 1.0);
        assert_eq!(out[6000], 0.5);
        assert_eq!(out[9000], 0.25);
    }

    #[test]
    fn test_no_feedback_single_echo() {
        let out = impulse_response(0.0625, 0.0, 10_000);
        let nonzero = out.iter().filter(|s| s.abs() > 1e-9).count();
        assert_eq!(nonzero, 1);
    }

    #[test]
    fn test_high_feedback_stays_bounded() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut node = FeedbackDelayNode::new(0.01, 0.9, 1.0, &ctx);
        let mut buffer = vec![0.5; 48_000];
        node.render_block(&mut buffer, &ctx);

        // Constant input converges to input / (1 - feedback)
        for sample in &buffer {
            assert!(sample.is_finite());
            assert!(sample.abs() <= 5.0 + 1e-3, "delay grew to {sample}");
        }
    }

    #[test]
    fn test_feedback_capped_below_unity() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut node = FeedbackDelayNode::new(0.1, 0.4, 1.0, &ctx);
        node.set_param(DelayParam::Feedback, 3.0, &ctx);
        assert!(node.param(DelayParam::Feedback) < 1.0);
    }

    #[test]
    fn test_delay_time_limited_by_buffer() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut node = FeedbackDelayNode::new(0.1, 0.0, 0.5, &ctx);
        node.set_param(DelayParam::Time, 2.0, &ctx);
        assert!(node.delay_samples <= node.line.capacity() as f32);
    }
}
