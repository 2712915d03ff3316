use std::f32::consts::TAU;

use crate::graph::node::RenderCtx;

/*
Lowpass State-Variable Filter
=============================

The wet path rolls off the high end of the echo train before it hits the
waveshaper, so each repeat gets darker and the distortion stays smooth
instead of fizzy.

  Level
    0 dB ───────────╮
                     ╲
                      ╲   12 dB/octave
                       ╲
                        ╲
         ──────────────┼──────────────→ Frequency
                     cutoff

The filter is a TPT (topology-preserving transform) state-variable filter:
two trapezoidal integrators in a loop. Its coefficient `g` is prewarped so
the analog cutoff lands exactly at the requested digital frequency:

    g = tan(π · fc / fs)

Resonance feeds back through `k = 2 − 2·resonance`. At resonance 0 the
response is maximally damped (k = 2); the graph uses a small resonance for a
gentle, Butterworth-ish knee.
*/

/// Damping giving a near-Butterworth response (Q ≈ 0.707 → k ≈ 1.414).
pub const DEFAULT_RESONANCE: f32 = 0.29;

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub resonance: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            resonance: DEFAULT_RESONANCE,
        }
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        // Keep the prewarp away from Nyquist where tan() blows up
        let nyquist = ctx.sample_rate * 0.5;
        let cutoff = self.cutoff_hz.clamp(10.0, nyquist * 0.99);
        (TAU * cutoff / (2.0 * ctx.sample_rate)).tan()
    }

    /// Advance the filter one sample and return the lowpass output.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = 2.0 - (2.0 * self.resonance);

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }
}
