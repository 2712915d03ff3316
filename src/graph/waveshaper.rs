use std::sync::Arc;

use crate::{
    dsp::distortion::DistortionCurve,
    graph::node::{GraphNode, RenderCtx},
};

/*
Waveshaper Node
===============

Maps every sample through a transfer curve. The curve is shared immutably:
the control side synthesizes a whole new table and the node swaps its
handle between two blocks. A block is therefore always shaped by exactly one
complete curve, never by a mix of old and new entries.

The old handle is returned from `swap_curve` so the caller decides where it
is dropped; the audio thread hands it back to the control side instead of
freeing a 44100-entry table inside the callback.
*/

pub struct WaveShaperNode {
    curve: Arc<DistortionCurve>,
}

impl WaveShaperNode {
    pub fn new(curve: Arc<DistortionCurve>) -> Self {
        Self { curve }
    }

    /// Install `curve`, returning the one it replaces.
    pub fn swap_curve(&mut self, curve: Arc<DistortionCurve>) -> Arc<DistortionCurve> {
        std::mem::replace(&mut self.curve, curve)
    }

    pub fn curve(&self) -> &Arc<DistortionCurve> {
        &self.curve
    }
}

impl GraphNode for WaveShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.curve.shape_buffer(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::distortion::synthesize;

    #[test]
    fn test_swap_returns_previous_curve() {
        let first = Arc::new(synthesize(100.0));
        let mut node = WaveShaperNode::new(first.clone());

        let old = node.swap_curve(Arc::new(synthesize(700.0)));

        assert!(Arc::ptr_eq(&old, &first));
        assert_eq!(node.curve().drive(), 700.0);
    }

    #[test]
    fn test_block_uses_installed_curve() {
        let ctx = RenderCtx::new(48_000.0);
        let curve = Arc::new(synthesize(400.0));
        let mut node = WaveShaperNode::new(curve.clone());

        let mut buffer = [0.0, 0.25, -0.5, 1.0];
        let expected = buffer.map(|x| curve.shape(x));
        node.render_block(&mut buffer, &ctx);

        assert_eq!(buffer, expected);
    }
}
