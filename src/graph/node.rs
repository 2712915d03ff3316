/// Context passed to graph nodes during rendering
///
/// The effect chain runs continuously on live input, so the only thing a node
/// needs to know about the block it renders is the stream's sample rate.
#[derive(Clone, Copy, Debug)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Convert a duration in seconds into (fractional) samples.
    #[inline]
    pub fn seconds_to_samples(&self, seconds: f32) -> f32 {
        seconds * self.sample_rate
    }
}

/// Trait for nodes whose parameters are written from the control side
///
/// Writes are direct: the new value takes effect on the next rendered sample.
/// Values arrive already clamped; nodes only guard against what would break
/// their own arithmetic.
pub trait Automatable: Send {
    type Param: Copy + Send;

    fn param(&self, param: Self::Param) -> f32;

    fn set_param(&mut self, param: Self::Param, value: f32, ctx: &RenderCtx);
}

/// Core trait for audio processing graph nodes
///
/// A node processes a block in place: `out` holds the node's input on entry
/// and its output on return.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Clear any internal history (delay lines, filter state).
    ///
    /// Default implementation does nothing (stateless nodes).
    fn reset(&mut self) {
        // Default: do nothing
    }
}

