use std::sync::Arc;

use crate::{dsp::distortion::DistortionCurve, params::Param};

/// Control-side writes delivered to the audio thread.
#[derive(Debug, Clone)]
pub enum GraphMessage {
    /// Write an already clamped value into the node behind `Param`.
    Set(Param, f32),
    /// Replace the waveshaper table. The old table comes back on the
    /// retired ring.
    SwapCurve(Arc<DistortionCurve>),
}

/// Gain target for the input gate, with the time to reach it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateCommand {
    pub target: f32,
    pub ramp_secs: f32,
}

impl GateCommand {
    pub fn open(ramp_secs: f32) -> Self {
        Self {
            target: 1.0,
            ramp_secs,
        }
    }

    pub fn close(ramp_secs: f32) -> Self {
        Self {
            target: 0.0,
            ramp_secs,
        }
    }
}
