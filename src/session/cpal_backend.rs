//! Sound card backend.
//!
//! Two cpal streams bridged by a ring: the input callback downmixes to mono
//! and pushes, the output callback pops, runs the engine and duplicates the
//! result to every output channel.
//!
//! ```text
//!   input device ──(mono)──→ rtrb ──→ output callback: GraphEngine ──→ all channels
//! ```
//!
//! Both streams run at the output device's sample rate. When the input runs
//! ahead the oldest samples are skipped, so latency stays bounded; when it
//! runs behind the engine hears silence.

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SampleFormat, SizedSample,
};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info, warn};

use crate::{
    config::SessionConfig,
    engine::GraphEngine,
    error::{Result, SessionError},
    session::backend::{AudioBackend, DeviceConfig, RunningDevice},
    MAX_BLOCK_SIZE,
};

/// Devices found by [`AudioBackend::acquire`], waiting to be started.
struct Acquired {
    input: cpal::Device,
    output: cpal::Device,
    input_config: cpal::StreamConfig,
    input_format: SampleFormat,
    output_config: cpal::StreamConfig,
    output_format: SampleFormat,
}

#[derive(Default)]
pub struct CpalBackend {
    acquired: Option<Acquired>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Names of the devices the default host can see.
#[derive(Debug, Clone, Default)]
pub struct DeviceList {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

pub fn list_devices() -> Result<DeviceList> {
    let host = cpal::default_host();
    let names = |devices: Vec<cpal::Device>| {
        devices
            .iter()
            .filter_map(|device| device.name().ok())
            .collect::<Vec<_>>()
    };

    let inputs = host.input_devices().map_err(SessionError::device)?.collect();
    let outputs = host.output_devices().map_err(SessionError::device)?.collect();
    Ok(DeviceList {
        inputs: names(inputs),
        outputs: names(outputs),
    })
}

fn find_device(
    mut devices: impl Iterator<Item = cpal::Device>,
    name: &str,
) -> Option<cpal::Device> {
    devices.find(|device| device.name().is_ok_and(|n| n == name))
}

impl AudioBackend for CpalBackend {
    fn acquire(&mut self, config: &SessionConfig) -> Result<DeviceConfig> {
        let host = cpal::default_host();
        info!(host = ?host.id(), "acquiring audio devices");

        let input = match &config.input_device {
            Some(name) => find_device(host.input_devices().map_err(SessionError::device)?, name)
                .ok_or_else(|| SessionError::device(format!("no input device named `{name}`")))?,
            None => host
                .default_input_device()
                .ok_or_else(|| SessionError::device("no input device available"))?,
        };
        let output = match &config.output_device {
            Some(name) => find_device(host.output_devices().map_err(SessionError::device)?, name)
                .ok_or_else(|| SessionError::device(format!("no output device named `{name}`")))?,
            None => host
                .default_output_device()
                .ok_or_else(|| SessionError::device("no output device available"))?,
        };

        let output_supported = output
            .default_output_config()
            .map_err(|e| SessionError::device(format!("output config: {e}")))?;
        let input_supported = input
            .default_input_config()
            .map_err(|e| SessionError::device(format!("input config: {e}")))?;

        // One clock for both sides; the output decides
        let sample_rate = output_supported.sample_rate();
        let output_config = cpal::StreamConfig {
            channels: output_supported.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        let input_config = cpal::StreamConfig {
            channels: input_supported.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let device_config = DeviceConfig {
            sample_rate: sample_rate.0,
            input_channels: input_config.channels,
            output_channels: output_config.channels,
            input_name: input.name().unwrap_or_else(|_| "input".to_string()),
            output_name: output.name().unwrap_or_else(|_| "output".to_string()),
        };

        self.acquired = Some(Acquired {
            input,
            output,
            input_config,
            input_format: input_supported.sample_format(),
            output_config,
            output_format: output_supported.sample_format(),
        });
        Ok(device_config)
    }

    fn start(&mut self, engine: GraphEngine) -> Result<Box<dyn RunningDevice>> {
        let acquired = self
            .acquired
            .take()
            .ok_or_else(|| SessionError::device("start called before acquire"))?;

        // About a second of input headroom
        let capacity = (acquired.output_config.sample_rate.0 as usize).max(MAX_BLOCK_SIZE * 2);
        let (input_tx, input_rx) = RingBuffer::<f32>::new(capacity);

        let input_stream = match acquired.input_format {
            SampleFormat::F32 => build_input::<f32>(&acquired, input_tx),
            SampleFormat::I16 => build_input::<i16>(&acquired, input_tx),
            SampleFormat::U16 => build_input::<u16>(&acquired, input_tx),
            other => Err(SessionError::device(format!(
                "unsupported input sample format {other:?}"
            ))),
        }?;
        let output_stream = match acquired.output_format {
            SampleFormat::F32 => build_output::<f32>(&acquired, input_rx, engine),
            SampleFormat::I16 => build_output::<i16>(&acquired, input_rx, engine),
            SampleFormat::U16 => build_output::<u16>(&acquired, input_rx, engine),
            other => Err(SessionError::device(format!(
                "unsupported output sample format {other:?}"
            ))),
        }?;

        input_stream
            .play()
            .map_err(|e| SessionError::device(format!("input stream: {e}")))?;
        output_stream
            .play()
            .map_err(|e| SessionError::device(format!("output stream: {e}")))?;

        let name = acquired
            .output
            .name()
            .unwrap_or_else(|_| "cpal".to_string());
        Ok(Box::new(CpalDevice {
            name,
            _input: input_stream,
            output: output_stream,
        }))
    }
}

fn build_input<T>(acquired: &Acquired, mut input_tx: Producer<f32>) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = acquired.input_config.channels.max(1) as usize;
    let scale = 1.0 / channels as f32;

    acquired
        .input
        .build_input_stream(
            &acquired.input_config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for frame in data.chunks(channels) {
                    let mono: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                    // Full means the output side stalled; drop
                    let _ = input_tx.push(mono * scale);
                }
            },
            |err| error!("input stream error: {}", err),
            None,
        )
        .map_err(|e| SessionError::device(format!("input stream: {e}")))
}

fn build_output<T>(
    acquired: &Acquired,
    mut input_rx: Consumer<f32>,
    mut engine: GraphEngine,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = acquired.output_config.channels.max(1) as usize;
    let mut in_buf = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut out_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    acquired
        .output
        .build_output_stream(
            &acquired.output_config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let total_frames = data.len() / channels;

                // Keep at most one extra callback of input queued
                let backlog = input_rx.slots();
                let allowed = total_frames * 2 + MAX_BLOCK_SIZE;
                if backlog > allowed {
                    if let Ok(chunk) = input_rx.read_chunk(backlog - allowed) {
                        chunk.commit_all();
                    }
                }

                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let input = &mut in_buf[..frames];
                    for sample in input.iter_mut() {
                        *sample = input_rx.pop().unwrap_or(0.0);
                    }

                    let output = &mut out_buf[..frames];
                    engine.process(input, output);

                    // Mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in output.iter().enumerate() {
                        let value = T::from_sample(s);
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = value;
                        }
                    }

                    frames_written += frames;
                }
            },
            |err| error!("output stream error: {}", err),
            None,
        )
        .map_err(|e| SessionError::device(format!("output stream: {e}")))
}

/// Running input and output streams. Dropping it stops both.
pub struct CpalDevice {
    name: String,
    _input: cpal::Stream,
    output: cpal::Stream,
}

impl RunningDevice for CpalDevice {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for CpalDevice {
    fn drop(&mut self) {
        if let Err(err) = self.output.pause() {
            warn!("failed to pause output stream: {}", err);
        }
        info!(device = %self.name, "audio streams closed");
    }
}
