pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod gate;
pub mod graph; // Fixed effect topology and its nodes
pub mod manager;
pub mod params;
pub mod preset;
pub mod session; // Lifecycle: device, graph, gate and visualizer
pub mod task;
pub mod visual; // Spectrum/trace/particle display fed from the analysis tap

pub use config::{GateConfig, SessionConfig, VisualConfig};
pub use error::{Result, SessionError};
pub use params::{Param, ParameterStore};
pub use preset::{Preset, PresetTable};
pub use session::{EffectSession, SessionState};

pub const MAX_BLOCK_SIZE: usize = 2048;
