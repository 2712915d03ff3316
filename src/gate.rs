//! Noise gate control loop.
//!
//! The gate is split in two. The audio thread only applies gain ramps to the
//! input (see [`GainNode`](crate::graph::gain::GainNode)); deciding *when* to
//! ramp happens here, on a periodic task reading the raw monitor tap:
//!
//! ```text
//!   every tick:
//!     window  = last N monitor samples, as bytes
//!     rms     = sqrt(mean(((b - 128) / 128)²))
//!     rms < threshold  →  ramp input gain to 0.0 over 50 ms   (slow close)
//!     otherwise        →  ramp input gain to 1.0 over 10 ms   (fast open)
//! ```
//!
//! The close is slow so the tail of a note fades instead of being chopped;
//! the open is fast so a pick attack gets through nearly intact. The command
//! is re-sent every tick; a ramp already heading to the same target ignores
//! it.

use std::{
    collections::VecDeque,
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
};

use rtrb::{Consumer, Producer};
use tracing::{debug, trace};

use crate::{
    config::GateConfig,
    dsp::analysis::{byte_rms, sample_to_byte},
    engine::GateCommand,
};

/// Result of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateState {
    /// RMS of the evaluated window
    pub envelope: f32,
    /// Input gain the gate is steering toward
    pub gain_target: f32,
}

/// Pure decision logic: window in, state and command out.
pub struct GateController {
    config: GateConfig,
    open: Option<bool>,
}

impl GateController {
    pub fn new(config: GateConfig) -> Self {
        Self { config, open: None }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Whether the last tick opened the gate (`None` before the first tick).
    pub fn is_open(&self) -> Option<bool> {
        self.open
    }

    /// Evaluate one window of monitor bytes.
    pub fn tick(&mut self, window: &[u8]) -> (GateState, GateCommand) {
        let envelope = byte_rms(window);
        let open = envelope >= self.config.threshold;

        if self.open != Some(open) {
            debug!(
                rms = envelope,
                threshold = self.config.threshold,
                "gate {}",
                if open { "opening" } else { "closing" }
            );
            self.open = Some(open);
        }

        let command = if open {
            GateCommand::open(self.config.open_secs())
        } else {
            GateCommand::close(self.config.close_secs())
        };
        let state = GateState {
            envelope,
            gain_target: command.target,
        };
        (state, command)
    }
}

/// Latest gate readings, shared with whoever displays them.
#[derive(Debug, Default)]
pub struct GateMeter {
    rms_bits: AtomicU32,
    open: AtomicBool,
}

impl GateMeter {
    pub fn rms(&self) -> f32 {
        f32::from_bits(self.rms_bits.load(Ordering::Relaxed))
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    fn publish(&self, state: &GateState) {
        self.rms_bits
            .store(state.envelope.to_bits(), Ordering::Relaxed);
        self.open
            .store(state.gain_target > 0.0, Ordering::Relaxed);
    }

    /// Back to the closed, silent reading.
    pub fn reset(&self) {
        self.rms_bits.store(0.0f32.to_bits(), Ordering::Relaxed);
        self.open.store(false, Ordering::Relaxed);
    }
}

/// One gate tick's worth of work, run by the session's gate task.
pub struct GateLoop {
    controller: GateController,
    monitor_rx: Consumer<f32>,
    gate_tx: Producer<GateCommand>,
    window: VecDeque<u8>,
    bytes: Vec<u8>,
    meter: Arc<GateMeter>,
}

impl GateLoop {
    pub fn new(
        config: GateConfig,
        monitor_rx: Consumer<f32>,
        gate_tx: Producer<GateCommand>,
        meter: Arc<GateMeter>,
    ) -> Self {
        let size = config.window.max(1);
        Self {
            controller: GateController::new(config),
            monitor_rx,
            gate_tx,
            window: VecDeque::with_capacity(size),
            bytes: Vec::with_capacity(size),
            meter,
        }
    }

    /// Drain the monitor tap, evaluate the newest window and send the command.
    ///
    /// Once the engine is gone this does nothing; the task keeps running until
    /// the session cancels it.
    pub fn tick(&mut self) -> ControlFlow<()> {
        if self.monitor_rx.is_abandoned() && self.monitor_rx.is_empty() {
            trace!("gate tick skipped, engine torn down");
            return ControlFlow::Continue(());
        }

        let size = self.controller.config().window.max(1);
        while let Ok(sample) = self.monitor_rx.pop() {
            if self.window.len() == size {
                self.window.pop_front();
            }
            self.window.push_back(sample_to_byte(sample));
        }

        self.bytes.clear();
        self.bytes.extend(self.window.iter().copied());
        let (state, command) = self.controller.tick(&self.bytes);
        self.meter.publish(&state);

        if !self.gate_tx.is_abandoned() {
            // A full queue means the engine is stalled; the next tick re-sends
            let _ = self.gate_tx.push(command);
        }
        ControlFlow::Continue(())
    }

    pub fn controller(&self) -> &GateController {
        &self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    fn controller() -> GateController {
        GateController::new(GateConfig::default())
    }

    #[test]
    fn test_silence_closes_slowly() {
        let (state, command) = controller().tick(&[128; 256]);
        assert_eq!(state.envelope, 0.0);
        assert_eq!(state.gain_target, 0.0);
        assert_eq!(command, GateCommand::close(0.05));
    }

    #[test]
    fn test_playing_opens_fast() {
        let window: Vec<u8> = (0..256).map(|i| if i % 2 == 0 { 140 } else { 116 }).collect();
        let (state, command) = controller().tick(&window);
        assert!(state.envelope > 0.0008);
        assert_eq!(state.gain_target, 1.0);
        assert_eq!(command, GateCommand::open(0.01));
    }

    #[test]
    fn test_threshold_boundary() {
        let mut gate = controller();
        // One off-centre byte in 256: rms = (1/128)/16 ≈ 0.00049, below threshold
        let mut window = [128u8; 256];
        window[0] = 129;
        assert_eq!(gate.tick(&window).0.gain_target, 0.0);

        // Three off-centre bytes: rms ≈ 0.00085, above threshold
        window[1] = 127;
        window[2] = 129;
        assert_eq!(gate.tick(&window).0.gain_target, 1.0);
    }

    #[test]
    fn test_open_state_tracks_transitions() {
        let mut gate = controller();
        assert_eq!(gate.is_open(), None);
        gate.tick(&[128; 16]);
        assert_eq!(gate.is_open(), Some(false));
        gate.tick(&[255; 16]);
        assert_eq!(gate.is_open(), Some(true));
    }

    #[test]
    fn test_loop_uses_newest_window() {
        let (mut monitor_tx, monitor_rx) = RingBuffer::<f32>::new(4096);
        let (gate_tx, mut gate_rx) = RingBuffer::<GateCommand>::new(8);
        let meter = Arc::new(GateMeter::default());
        let mut gate = GateLoop::new(GateConfig::default(), monitor_rx, gate_tx, meter.clone());

        // Loud, then a full window of silence: only the silence counts
        for _ in 0..1000 {
            monitor_tx.push(0.5).unwrap();
        }
        for _ in 0..256 {
            monitor_tx.push(0.0).unwrap();
        }
        gate.tick();

        assert_eq!(gate_rx.pop().unwrap(), GateCommand::close(0.05));
        assert!(!meter.is_open());
        assert_eq!(meter.rms(), 0.0);
    }

    #[test]
    fn test_loop_is_noop_after_teardown() {
        let (monitor_tx, monitor_rx) = RingBuffer::<f32>::new(64);
        let (gate_tx, mut gate_rx) = RingBuffer::<GateCommand>::new(8);
        let mut gate = GateLoop::new(
            GateConfig::default(),
            monitor_rx,
            gate_tx,
            Arc::new(GateMeter::default()),
        );

        drop(monitor_tx);
        assert_eq!(gate.tick(), ControlFlow::Continue(()));
        assert!(gate_rx.pop().is_err());
    }
}
