//! Backend driven by the host instead of a sound card.
//!
//! The engine is parked behind a mutex and advanced by calling
//! [`ManualDriver::process`], so an embedding host (or a test) decides when
//! audio happens and what the input is.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use tracing::debug;

use crate::{
    config::SessionConfig,
    engine::GraphEngine,
    error::{Result, SessionError},
    params::Param,
    session::backend::{AudioBackend, DeviceConfig, RunningDevice},
};

#[derive(Default)]
struct Shared {
    engine: Mutex<Option<GraphEngine>>,
    failure: Mutex<Option<String>>,
    acquisitions: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ManualBackend {
    sample_rate: u32,
    shared: Arc<Shared>,
}

impl ManualBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            shared: Arc::new(Shared::default()),
        }
    }

    /// A backend whose device acquisition fails with `reason`.
    pub fn unavailable(sample_rate: u32, reason: impl Into<String>) -> Self {
        let backend = Self::new(sample_rate);
        *lock(&backend.shared.failure) = Some(reason.into());
        backend
    }

    /// Handle for pushing audio through whatever engine is running.
    pub fn driver(&self) -> ManualDriver {
        ManualDriver {
            shared: self.shared.clone(),
        }
    }
}

impl AudioBackend for ManualBackend {
    fn acquire(&mut self, _config: &SessionConfig) -> Result<DeviceConfig> {
        if let Some(reason) = lock(&self.shared.failure).clone() {
            return Err(SessionError::device(reason));
        }
        self.shared.acquisitions.fetch_add(1, Ordering::Relaxed);

        Ok(DeviceConfig {
            sample_rate: self.sample_rate,
            input_channels: 1,
            output_channels: 1,
            input_name: "manual input".to_string(),
            output_name: "manual output".to_string(),
        })
    }

    fn start(&mut self, engine: GraphEngine) -> Result<Box<dyn RunningDevice>> {
        *lock(&self.shared.engine) = Some(engine);
        debug!("manual device started");
        Ok(Box::new(ManualDevice {
            shared: self.shared.clone(),
        }))
    }
}

struct ManualDevice {
    shared: Arc<Shared>,
}

impl RunningDevice for ManualDevice {
    fn name(&self) -> &str {
        "manual"
    }
}

impl Drop for ManualDevice {
    fn drop(&mut self) {
        // Dropping the engine abandons its rings
        lock(&self.shared.engine).take();
        debug!("manual device released");
    }
}

/// Host-side handle of a [`ManualBackend`].
#[derive(Clone)]
pub struct ManualDriver {
    shared: Arc<Shared>,
}

impl ManualDriver {
    /// Run one callback. Without a running engine the output is silence and
    /// `false` is returned.
    pub fn process(&self, input: &[f32], output: &mut [f32]) -> bool {
        match lock(&self.shared.engine).as_mut() {
            Some(engine) => {
                engine.process(input, output);
                true
            }
            None => {
                output.fill(0.0);
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared.engine).is_some()
    }

    /// Number of successful device acquisitions so far.
    pub fn acquisitions(&self) -> usize {
        self.shared.acquisitions.load(Ordering::Relaxed)
    }

    /// Make the next acquisitions fail (`Some`) or succeed again (`None`).
    pub fn set_failure(&self, reason: Option<String>) {
        *lock(&self.shared.failure) = reason;
    }

    /// Read a value from the running graph, as the audio thread sees it.
    pub fn graph_value(&self, param: Param) -> Option<f32> {
        lock(&self.shared.engine)
            .as_ref()
            .map(|engine| engine.graph().value(param))
    }

    /// Current input gate gain on the audio thread.
    pub fn gate_gain(&self) -> Option<f32> {
        lock(&self.shared.engine)
            .as_ref()
            .map(|engine| engine.graph().gate_gain())
    }
}
