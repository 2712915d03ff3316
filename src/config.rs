//! Session configuration.
//!
//! `SessionConfig` is built in code with chained setters. With the `serde`
//! feature, a TOML [`Settings`] file can provide the gate/visual sections and
//! replace the built-in preset table.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::{error::SessionError, preset::Preset};

/// Noise gate tuning.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct GateConfig {
    /// RMS below which the input is considered silent
    pub threshold: f32,
    /// Ramp time to fully open, in milliseconds
    pub open_ms: f32,
    /// Ramp time to fully closed, in milliseconds
    pub close_ms: f32,
    /// Number of most recent monitor samples per RMS estimate
    pub window: usize,
    /// Monitoring tick period, in milliseconds
    pub poll_interval_ms: u64,
}

impl GateConfig {
    pub fn open_secs(&self) -> f32 {
        self.open_ms / 1000.0
    }

    pub fn close_secs(&self) -> f32 {
        self.close_ms / 1000.0
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            // Low enough that soft picking still opens the gate
            threshold: 0.0008,
            open_ms: 10.0,
            close_ms: 50.0,
            window: 256,
            poll_interval_ms: 16,
        }
    }
}

/// Visualizer tuning.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct VisualConfig {
    /// Run the visualizer task at all (headless hosts turn this off)
    pub enabled: bool,
    /// Analysis window; frames carry half this many bins and samples
    pub fft_size: usize,
    /// Render tick period, in milliseconds
    pub frame_interval_ms: u64,
    /// Drawable surface size in canvas units
    pub width: f32,
    pub height: f32,
    /// Drive above which frames get a random jitter
    pub glitch_threshold: f32,
}

impl VisualConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fft_size: 1024,
            frame_interval_ms: 16,
            width: 400.0,
            height: 200.0,
            glitch_threshold: 600.0,
        }
    }
}

/// Everything a session needs besides the backend.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub input_device: Option<String>,
    pub output_device: Option<String>,
    pub gate: GateConfig,
    pub visual: VisualConfig,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_device(mut self, name: impl Into<String>) -> Self {
        self.input_device = Some(name.into());
        self
    }

    pub fn output_device(mut self, name: impl Into<String>) -> Self {
        self.output_device = Some(name.into());
        self
    }

    pub fn gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    pub fn visual(mut self, visual: VisualConfig) -> Self {
        self.visual = visual;
        self
    }

    pub fn headless(mut self) -> Self {
        self.visual.enabled = false;
        self
    }
}

/// On-disk settings file.
///
/// ```toml
/// [gate]
/// threshold = 0.001
///
/// [[preset]]
/// name = "Heaven Delay"
/// delayTime = 0.2
/// feedback = 0.5
/// decay = 9.0
/// preDelay = 0.05
/// wet = 0.7
/// filterFreq = 4200.0
/// distortion = 200.0
/// ```
#[cfg(feature = "serde")]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gate: GateConfig,
    pub visual: VisualConfig,
    #[serde(rename = "preset")]
    pub presets: Vec<Preset>,
}

#[cfg(feature = "serde")]
impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, SessionError> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| SessionError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), SessionError> {
        if !(self.gate.threshold.is_finite() && self.gate.threshold >= 0.0) {
            return Err(SessionError::Config("gate.threshold must be >= 0".into()));
        }
        if self.gate.window == 0 {
            return Err(SessionError::Config("gate.window must be > 0".into()));
        }
        if !self.visual.fft_size.is_power_of_two() || self.visual.fft_size < 32 {
            return Err(SessionError::Config(
                "visual.fft_size must be a power of two >= 32".into(),
            ));
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .gate(self.gate.clone())
            .visual(self.visual.clone())
    }
}
