use crate::{config::SessionConfig, engine::GraphEngine, error::Result};

/// What the acquired devices look like.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub sample_rate: u32,
    pub input_channels: u16,
    pub output_channels: u16,
    pub input_name: String,
    pub output_name: String,
}

impl DeviceConfig {
    /// Samples a tap can hold before it starts dropping: a quarter second,
    /// never less than a few analysis windows.
    pub fn tap_capacity(&self) -> usize {
        (self.sample_rate as usize / 4).max(4096)
    }
}

/// A started device. Dropping it stops the streams and releases the
/// hardware, which also drops the engine.
pub trait RunningDevice {
    fn name(&self) -> &str;
}

/// Where audio comes from and goes to.
pub trait AudioBackend {
    /// Find and open the devices, without starting any stream yet.
    fn acquire(&mut self, config: &SessionConfig) -> Result<DeviceConfig>;

    /// Move the engine onto the audio thread and start streaming.
    fn start(&mut self, engine: GraphEngine) -> Result<Box<dyn RunningDevice>>;
}
