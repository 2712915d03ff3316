//! Lifecycle of one effect session.
//!
//! ```text
//!   Idle ──start()──→ Starting ──wired──→ Running ──stop()──→ Stopping ──→ Idle
//!                        │
//!                        └── any failure: unwind, back to Idle, error returned
//! ```
//!
//! Only the session decides when the graph, the gate loop and the visualizer
//! exist. Parameter values live here between runs, so a restarted session
//! picks up where the last one left off.

pub mod backend;
pub mod cpal_backend;
pub mod manual;

use std::{fmt, sync::Arc};

use rtrb::{Consumer, RingBuffer};
use tracing::{debug, info, warn};

pub use backend::{AudioBackend, DeviceConfig, RunningDevice};
pub use cpal_backend::CpalBackend;
pub use manual::{ManualBackend, ManualDriver};

use crate::{
    config::SessionConfig,
    dsp::distortion::synthesize,
    engine::GraphEngine,
    error::{Result, SessionError},
    gate::{GateLoop, GateMeter},
    graph::SignalGraph,
    manager::GraphManager,
    params::{Param, ParameterStore},
    preset::PresetTable,
    task::PeriodicTask,
    visual::{DisplayList, SharedVisualParams, VisualLoop, VisualParams},
};

/// Rendered frames waiting for the host; older ones are skipped.
const FRAME_QUEUE_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Running,
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Everything that only exists while the session is running.
struct Running {
    device_config: DeviceConfig,
    manager: GraphManager,
    device: Box<dyn RunningDevice>,
    gate_task: PeriodicTask,
    visual_task: Option<PeriodicTask>,
    frames: Option<Consumer<DisplayList>>,
}

pub struct EffectSession<B: AudioBackend> {
    backend: B,
    config: SessionConfig,
    presets: PresetTable,
    /// Values used to build the next graph; owned by the manager while running
    params: ParameterStore,
    state: SessionState,
    running: Option<Running>,
    gate_meter: Arc<GateMeter>,
    visual_params: Arc<SharedVisualParams>,
    latest_frame: Option<DisplayList>,
}

impl<B: AudioBackend> EffectSession<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            presets: PresetTable::builtin(),
            params: ParameterStore::new(),
            state: SessionState::Idle,
            running: None,
            gate_meter: Arc::new(GateMeter::default()),
            visual_params: Arc::new(SharedVisualParams::new(VisualParams::default())),
            latest_frame: None,
        }
    }

    /// Replace the built-in preset table.
    pub fn with_presets(mut self, presets: PresetTable) -> Self {
        self.presets = presets;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once the graph is wired and accepting updates.
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Running
            && self
                .running
                .as_ref()
                .is_some_and(|running| running.manager.is_ready())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// Devices of the current run.
    pub fn device_config(&self) -> Option<&DeviceConfig> {
        self.running.as_ref().map(|running| &running.device_config)
    }

    pub fn gate_meter(&self) -> &Arc<GateMeter> {
        &self.gate_meter
    }

    /// Start streaming. Does nothing unless the session is idle.
    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            debug!(state = %self.state, "start ignored");
            return Ok(());
        }

        self.state = SessionState::Starting;
        match self.wire() {
            Ok(running) => {
                info!(
                    input = %running.device_config.input_name,
                    output = %running.device_config.output_name,
                    sample_rate = running.device_config.sample_rate,
                    device = running.device.name(),
                    "session running"
                );
                self.running = Some(running);
                self.state = SessionState::Running;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "session failed to start");
                self.state = SessionState::Idle;
                Err(err)
            }
        }
    }

    /// Build the graph and bring up the device and loops. Whatever was built
    /// before a failure is dropped on the way out.
    fn wire(&mut self) -> Result<Running> {
        let device_config = self.backend.acquire(&self.config)?;

        let curve = Arc::new(synthesize(self.params.get(Param::Distortion)));
        let graph = SignalGraph::new(
            device_config.sample_rate as f32,
            &self.params,
            curve.clone(),
        );
        let (engine, handles) = GraphEngine::new(graph, device_config.tap_capacity());
        let manager = GraphManager::new(
            self.params.clone(),
            curve,
            handles.control,
            handles.retired,
        );

        let device = self.backend.start(engine)?;

        self.gate_meter.reset();
        let mut gate = GateLoop::new(
            self.config.gate.clone(),
            handles.monitor,
            handles.gate,
            self.gate_meter.clone(),
        );
        let gate_task =
            PeriodicTask::spawn("gate", self.config.gate.poll_interval(), move || gate.tick())?;

        for (param, value) in self.params.iter() {
            self.visual_params.update(param, value);
        }
        let visual = &self.config.visual;
        let (visual_task, frames) = if visual.enabled {
            let (frame_tx, frame_rx) = RingBuffer::new(FRAME_QUEUE_SIZE);
            let mut visual_loop =
                VisualLoop::new(visual, handles.analysis, frame_tx, self.visual_params.clone());
            let task =
                PeriodicTask::spawn("visualizer", visual.frame_interval(), move || {
                    visual_loop.tick()
                })?;
            (Some(task), Some(frame_rx))
        } else {
            (None, None)
        };

        Ok(Running {
            device_config,
            manager,
            device,
            gate_task,
            visual_task,
            frames,
        })
    }

    /// Stop streaming and release the devices. Safe to call in any state.
    pub fn stop(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        let Some(running) = self.running.take() else {
            self.state = SessionState::Idle;
            return;
        };

        self.state = SessionState::Stopping;
        let Running {
            manager,
            device,
            mut gate_task,
            visual_task,
            frames,
            ..
        } = running;

        // Loops first, so nothing touches the engine while it goes away
        if let Some(mut task) = visual_task {
            task.cancel();
        }
        gate_task.cancel();
        drop(device);

        self.params = manager.into_params();
        drop(frames);
        self.latest_frame = None;
        self.gate_meter.reset();

        self.state = SessionState::Idle;
        info!("session stopped");
    }

    /// Set a parameter by name. Returns the value actually stored.
    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<f32> {
        let param: Param = name.parse()?;
        self.set_param(param, value)
    }

    /// Set a parameter. Out-of-range values are clamped, never rejected.
    pub fn set_param(&mut self, param: Param, value: f32) -> Result<f32> {
        let manager = self.ready_manager()?;
        let stored = manager.set_parameter(param, value);
        self.visual_params.update(param, stored);
        Ok(stored)
    }

    /// Apply a named preset as one batch.
    pub fn load_preset(&mut self, name: &str) -> Result<()> {
        let preset = self.presets.get(name)?.clone();
        let visual_params = self.visual_params.clone();
        let manager = self.ready_manager()?;
        manager.load_preset(&preset);
        for (param, value) in preset.values() {
            visual_params.update(param, manager.get(param));
            debug!(param = %param, value, "preset value");
        }
        info!(preset = %preset.name, "preset loaded");
        Ok(())
    }

    fn ready_manager(&mut self) -> Result<&mut GraphManager> {
        match self.running.as_mut() {
            Some(running)
                if self.state == SessionState::Running && running.manager.is_ready() =>
            {
                Ok(&mut running.manager)
            }
            _ => {
                warn!(state = %self.state, "update ignored, session not ready");
                Err(SessionError::NotReady)
            }
        }
    }

    /// Current value of `param`: the live one while running, otherwise the
    /// value the next run starts with.
    pub fn parameter(&self, param: Param) -> f32 {
        match &self.running {
            Some(running) => running.manager.get(param),
            None => self.params.get(param),
        }
    }

    pub fn parameters(&self) -> &ParameterStore {
        match &self.running {
            Some(running) => running.manager.params(),
            None => &self.params,
        }
    }

    /// Newest rendered visualizer frame, if the visualizer is running.
    pub fn latest_frame(&mut self) -> Option<&DisplayList> {
        if let Some(frames) = self.running.as_mut().and_then(|r| r.frames.as_mut()) {
            while let Ok(frame) = frames.pop() {
                self.latest_frame = Some(frame);
            }
        }
        self.latest_frame.as_ref()
    }
}

impl<B: AudioBackend> Drop for EffectSession<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
