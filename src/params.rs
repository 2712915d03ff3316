//! Named effect parameters, their ranges, and the control-side value store.

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::distortion::FALLBACK_DRIVE, error::SessionError};

/// Every continuously-valued control the effect exposes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    /// Echo spacing in seconds
    DelayTime,
    /// Gain of the delay self-loop (kept below unity)
    Feedback,
    /// Reverb tail length in seconds
    ReverbDecay,
    /// Gap before the reverb tail starts, in seconds
    PreDelay,
    /// Reverb dry/wet ratio
    ReverbWet,
    /// Lowpass cutoff in Hz
    FilterFreq,
    /// Waveshaper drive (`k` of the transfer curve)
    Distortion,
    /// Master output level
    OutputGain,
    /// Level of the unprocessed path into the output mixer
    DryGain,
}

/// Inclusive value range of a parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Position of `value` within the range, 0.0 to 1.0.
    pub fn normalize(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Param {
    pub const COUNT: usize = 9;

    pub const ALL: [Param; Param::COUNT] = [
        Param::DelayTime,
        Param::Feedback,
        Param::ReverbDecay,
        Param::PreDelay,
        Param::ReverbWet,
        Param::FilterFreq,
        Param::Distortion,
        Param::OutputGain,
        Param::DryGain,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used by control surfaces and preset tables.
    pub fn key(self) -> &'static str {
        match self {
            Param::DelayTime => "delayTime",
            Param::Feedback => "feedback",
            Param::ReverbDecay => "decay",
            Param::PreDelay => "preDelay",
            Param::ReverbWet => "wet",
            Param::FilterFreq => "filterFreq",
            Param::Distortion => "distortion",
            Param::OutputGain => "outputGain",
            Param::DryGain => "dryGain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Param::DelayTime => "Delay Time",
            Param::Feedback => "Feedback",
            Param::ReverbDecay => "Reverb Decay",
            Param::PreDelay => "Pre-Delay",
            Param::ReverbWet => "Reverb Wet",
            Param::FilterFreq => "Filter Freq",
            Param::Distortion => "Distortion",
            Param::OutputGain => "Output Gain",
            Param::DryGain => "Dry Gain",
        }
    }

    pub fn range(self) -> ParamRange {
        match self {
            Param::DelayTime => ParamRange::new(0.01, 1.0),
            // Upper bound keeps the delay self-loop strictly below unity gain
            Param::Feedback => ParamRange::new(0.0, 0.9),
            Param::ReverbDecay => ParamRange::new(0.1, 10.0),
            Param::PreDelay => ParamRange::new(0.0, 1.0),
            Param::ReverbWet => ParamRange::new(0.0, 1.0),
            Param::FilterFreq => ParamRange::new(200.0, 8000.0),
            Param::Distortion => ParamRange::new(0.0, 800.0),
            Param::OutputGain => ParamRange::new(0.0, 2.0),
            Param::DryGain => ParamRange::new(0.0, 4.0),
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            Param::DelayTime => 0.5,
            Param::Feedback => 0.4,
            Param::ReverbDecay => 6.0,
            Param::PreDelay => 0.03,
            Param::ReverbWet => 0.7,
            Param::FilterFreq => 4000.0,
            Param::Distortion => 400.0,
            Param::OutputGain => 0.6,
            Param::DryGain => 2.0,
        }
    }

    /// Knob step used by interactive control surfaces.
    pub fn step(self) -> f32 {
        match self {
            Param::ReverbDecay => 0.1,
            Param::FilterFreq => 10.0,
            Param::Distortion => 1.0,
            _ => 0.01,
        }
    }

    /// Value substituted for NaN and infinities.
    ///
    /// Drive has its own fallback, the one curve synthesis uses; everything
    /// else falls back to its default.
    pub fn non_finite_fallback(self) -> f32 {
        match self {
            Param::Distortion => FALLBACK_DRIVE,
            _ => self.default_value(),
        }
    }

    /// Bring any input into range.
    pub fn sanitize(self, value: f32) -> f32 {
        if value.is_finite() {
            self.range().clamp(value)
        } else {
            self.non_finite_fallback()
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Param {
    type Err = SessionError;

    /// Accepts the camelCase key or its snake_case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_').collect();
        Param::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| SessionError::UnknownParameter(s.to_string()))
    }
}

/// Control-side copy of every parameter value.
///
/// This is what `parameter()` queries read; the audio thread only ever sees
/// values after they pass through here.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterStore {
    values: [f32; Param::COUNT],
}

impl ParameterStore {
    pub fn new() -> Self {
        let mut values = [0.0; Param::COUNT];
        for param in Param::ALL {
            values[param.index()] = param.default_value();
        }
        Self { values }
    }

    pub fn get(&self, param: Param) -> f32 {
        self.values[param.index()]
    }

    /// Store a sanitized value and return what was actually stored.
    pub fn set(&mut self, param: Param, value: f32) -> f32 {
        let value = param.sanitize(value);
        self.values[param.index()] = value;
        value
    }

    pub fn iter(&self) -> impl Iterator<Item = (Param, f32)> + '_ {
        Param::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_is_clamped_below_unity() {
        let mut store = ParameterStore::new();
        for requested in [1.0, 1.5, 100.0, f32::MAX] {
            let stored = store.set(Param::Feedback, requested);
            assert!(stored < 1.0, "feedback {requested} stored as {stored}");
            assert_eq!(stored, store.get(Param::Feedback));
        }
    }

    #[test]
    fn test_out_of_range_values_clamp_to_bounds() {
        let mut store = ParameterStore::new();
        assert_eq!(store.set(Param::FilterFreq, 50_000.0), 8000.0);
        assert_eq!(store.set(Param::FilterFreq, -3.0), 200.0);
        assert_eq!(store.set(Param::DelayTime, 0.0), 0.01);
    }

    #[test]
    fn test_non_finite_falls_back_to_default() {
        let mut store = ParameterStore::new();
        assert_eq!(store.set(Param::DelayTime, f32::INFINITY), 0.5);
        assert_eq!(store.set(Param::FilterFreq, f32::NEG_INFINITY), 4000.0);
    }

    #[test]
    fn test_non_finite_drive_uses_curve_fallback() {
        let mut store = ParameterStore::new();
        store.set(Param::Distortion, 10.0);
        assert_eq!(store.set(Param::Distortion, f32::NAN), FALLBACK_DRIVE);
        assert_eq!(store.set(Param::Distortion, f32::INFINITY), 50.0);
    }

    #[test]
    fn test_fallbacks_lie_within_ranges() {
        for param in Param::ALL {
            let range = param.range();
            let value = param.non_finite_fallback();
            assert!(value >= range.min && value <= range.max, "{param}");
        }
    }

    #[test]
    fn test_defaults_lie_within_ranges() {
        for param in Param::ALL {
            let range = param.range();
            let value = param.default_value();
            assert!(value >= range.min && value <= range.max, "{param}");
        }
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("delayTime".parse::<Param>().unwrap(), Param::DelayTime);
        assert_eq!("delay_time".parse::<Param>().unwrap(), Param::DelayTime);
        assert_eq!("filter_freq".parse::<Param>().unwrap(), Param::FilterFreq);
        assert_eq!("wet".parse::<Param>().unwrap(), Param::ReverbWet);
        assert!(matches!(
            "volume".parse::<Param>(),
            Err(SessionError::UnknownParameter(name)) if name == "volume"
        ));
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, param) in Param::ALL.into_iter().enumerate() {
            assert_eq!(param.index(), i);
        }
    }
}
