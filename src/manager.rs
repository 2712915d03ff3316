//! Control-side owner of the parameter values.
//!
//! Every write is sanitized, stored, and forwarded to the engine. The stored
//! value is the one reads return, whether or not the engine has applied it
//! yet.

use std::sync::Arc;

use rtrb::{Consumer, Producer};
use tracing::{debug, warn};

use crate::{
    dsp::distortion::{synthesize, DistortionCurve},
    engine::GraphMessage,
    params::{Param, ParameterStore},
    preset::Preset,
};

pub struct GraphManager {
    params: ParameterStore,
    curve: Arc<DistortionCurve>,
    control_tx: Producer<GraphMessage>,
    retired_rx: Consumer<Arc<DistortionCurve>>,
    /// Values stored but not yet delivered because the ring was full
    dirty: [bool; Param::COUNT],
}

impl GraphManager {
    /// `curve` must be the table the engine's graph was built with.
    pub fn new(
        params: ParameterStore,
        curve: Arc<DistortionCurve>,
        control_tx: Producer<GraphMessage>,
        retired_rx: Consumer<Arc<DistortionCurve>>,
    ) -> Self {
        Self {
            params,
            curve,
            control_tx,
            retired_rx,
            dirty: [false; Param::COUNT],
        }
    }

    /// True while the engine on the other end of the rings is alive.
    pub fn is_ready(&self) -> bool {
        !self.control_tx.is_abandoned()
    }

    pub fn get(&self, param: Param) -> f32 {
        self.params.get(param)
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    /// Curve most recently sent to the waveshaper.
    pub fn curve(&self) -> &Arc<DistortionCurve> {
        &self.curve
    }

    /// Clamp, store and forward one value. Returns the stored value.
    pub fn set_parameter(&mut self, param: Param, value: f32) -> f32 {
        let stored = self.params.set(param, value);
        if stored != value {
            debug!(%param, requested = value, stored, "parameter clamped");
        }
        self.dirty[param.index()] = true;
        self.flush();
        stored
    }

    /// Store all preset values and send them as one batch.
    ///
    /// Out-of-range preset values are clamped like any other write.
    pub fn load_preset(&mut self, preset: &Preset) {
        for (param, value) in preset.values() {
            self.params.set(param, value);
            self.dirty[param.index()] = true;
        }
        debug!(preset = %preset.name, "preset stored");
        self.flush();
    }

    /// Deliver every dirty value in a single ring write.
    ///
    /// The engine drains whole batches at the top of a callback, so it sees
    /// either every value in the batch or none of them. If the ring lacks room
    /// for the whole batch nothing is sent and the values stay dirty.
    pub fn flush(&mut self) {
        self.collect_retired();

        let pending: Vec<Param> = Param::ALL
            .into_iter()
            .filter(|p| self.dirty[p.index()])
            .collect();
        if pending.is_empty() {
            return;
        }
        if self.control_tx.slots() < pending.len() {
            warn!(
                pending = pending.len(),
                "control queue full, parameters will be re-sent"
            );
            return;
        }

        let messages: Vec<GraphMessage> = pending.iter().map(|&p| self.message_for(p)).collect();
        match self.control_tx.write_chunk_uninit(messages.len()) {
            Ok(chunk) => {
                chunk.fill_from_iter(messages);
                for param in pending {
                    self.dirty[param.index()] = false;
                }
            }
            Err(err) => warn!(%err, "control queue write failed"),
        }
    }

    fn message_for(&mut self, param: Param) -> GraphMessage {
        let value = self.params.get(param);
        if param != Param::Distortion {
            return GraphMessage::Set(param, value);
        }

        if self.curve.drive() != value {
            self.curve = Arc::new(synthesize(value));
            debug!(drive = value, "curve resynthesized");
        }
        GraphMessage::SwapCurve(self.curve.clone())
    }

    /// Drop tables the audio thread has finished with.
    fn collect_retired(&mut self) {
        while let Ok(curve) = self.retired_rx.pop() {
            drop(curve);
        }
    }

    /// Hand the stored values back (for the next session start).
    pub fn into_params(self) -> ParameterStore {
        self.params
    }
}
