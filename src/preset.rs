//! Named, immutable parameter bundles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::SessionError, params::Param};

/// A read-only snapshot of the seven sound-shaping parameters.
///
/// Output and dry gain are deliberately not part of a preset; they are
/// monitoring levels, not part of the sound.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: String,
    pub delay_time: f32,
    pub feedback: f32,
    pub decay: f32,
    pub pre_delay: f32,
    pub wet: f32,
    pub filter_freq: f32,
    pub distortion: f32,
}

impl Preset {
    /// The preset as `(param, value)` pairs, in application order.
    pub fn values(&self) -> [(Param, f32); 7] {
        [
            (Param::DelayTime, self.delay_time),
            (Param::Feedback, self.feedback),
            (Param::ReverbDecay, self.decay),
            (Param::PreDelay, self.pre_delay),
            (Param::ReverbWet, self.wet),
            (Param::FilterFreq, self.filter_freq),
            (Param::Distortion, self.distortion),
        ]
    }
}

#[allow(clippy::too_many_arguments)]
fn preset(
    name: &str,
    delay_time: f32,
    feedback: f32,
    decay: f32,
    pre_delay: f32,
    wet: f32,
    filter_freq: f32,
    distortion: f32,
) -> Preset {
    Preset {
        name: name.to_string(),
        delay_time,
        feedback,
        decay,
        pre_delay,
        wet,
        filter_freq,
        distortion,
    }
}

/// Lookup table from preset name to bundle. Loaded once, never mutated.
#[derive(Clone, Debug)]
pub struct PresetTable {
    presets: Vec<Preset>,
}

impl PresetTable {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            preset("Swirly Pancakes", 0.18, 0.45, 5.0, 0.03, 0.5, 4500.0, 220.0),
            preset("Valentine Static", 0.22, 0.55, 8.0, 0.08, 0.55, 4000.0, 360.0),
            preset("Fast Cannonball", 0.15, 0.4, 6.0, 0.02, 0.45, 5000.0, 180.0),
            preset("Heaven Delay", 0.2, 0.5, 9.0, 0.05, 0.7, 4200.0, 200.0),
        ])
    }

    pub fn get(&self, name: &str) -> Result<&Preset, SessionError> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| SessionError::UnknownPreset(name.to_string()))
    }

    /// Preset by position, for number-key selection.
    pub fn nth(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin()
    }
}
