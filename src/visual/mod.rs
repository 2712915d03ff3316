//! Reactive display driven by the gated input.
//!
//! Purely cosmetic: nothing here feeds back into the audio path, and a
//! headless session skips it entirely.
//!
//! Each frame the [`Visualizer`] draws, in order:
//!
//! ```text
//!   1. translucent background fill   motion blur, hue from delay time
//!   2. (optional) random translation distortion above the glitch threshold
//!   3. spectrum bars                 one per bin, hue walks across bins
//!   4. waveform trace                through the time-domain bytes
//!   5. radial glow                   sized by mean spectrum level
//!   6. particles                     spawned at the centre, fading out
//!   7. identity transform restored
//! ```

pub mod analyser;
pub mod particles;
pub mod surface;

use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use rtrb::{Consumer, Producer};
use tracing::trace;

use crate::{config::VisualConfig, params::Param};

pub use analyser::Analyser;
pub use particles::{Particle, ParticleField};
pub use surface::{DisplayList, DrawOp, Hsla, Surface};

/// Largest random offset applied to a glitched frame, in surface units.
pub const GLITCH_JITTER: f32 = 5.0;

/// One analysis snapshot, consumed by a single render.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualFrame {
    pub frequency_bins: Vec<u8>,
    pub time_samples: Vec<u8>,
}

/// Parameter values the display reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub delay_time: f32,
    pub distortion: f32,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            delay_time: Param::DelayTime.default_value(),
            distortion: Param::Distortion.default_value(),
        }
    }
}

/// [`VisualParams`] shared between the control side and the visualizer task.
#[derive(Debug)]
pub struct SharedVisualParams {
    delay_time: AtomicU32,
    distortion: AtomicU32,
}

impl SharedVisualParams {
    pub fn new(params: VisualParams) -> Self {
        Self {
            delay_time: AtomicU32::new(params.delay_time.to_bits()),
            distortion: AtomicU32::new(params.distortion.to_bits()),
        }
    }

    pub fn load(&self) -> VisualParams {
        VisualParams {
            delay_time: f32::from_bits(self.delay_time.load(Ordering::Relaxed)),
            distortion: f32::from_bits(self.distortion.load(Ordering::Relaxed)),
        }
    }

    /// Mirror a stored parameter value; parameters the display ignores are
    /// skipped.
    pub fn update(&self, param: Param, value: f32) {
        match param {
            Param::DelayTime => self.delay_time.store(value.to_bits(), Ordering::Relaxed),
            Param::Distortion => self.distortion.store(value.to_bits(), Ordering::Relaxed),
            _ => {}
        }
    }
}

impl Default for SharedVisualParams {
    fn default() -> Self {
        Self::new(VisualParams::default())
    }
}

pub struct Visualizer {
    glitch_threshold: f32,
    particles: ParticleField,
    rng: StdRng,
}

impl Visualizer {
    pub fn new(config: &VisualConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic randomness, for tests and recordings.
    pub fn with_rng(config: &VisualConfig, rng: StdRng) -> Self {
        Self {
            glitch_threshold: config.glitch_threshold,
            particles: ParticleField::new(),
            rng,
        }
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// Draw one frame into `surface`.
    pub fn render(&mut self, frame: &VisualFrame, params: VisualParams, surface: &mut impl Surface) {
        let (width, height) = surface.size();
        let hue_base = params.delay_time * 360.0;

        surface.fill_background(Hsla::new(hue_base, 0.5, 0.1, 0.1));

        let glitch = params.distortion > self.glitch_threshold;
        if glitch {
            let dx = self.rng.gen_range(-GLITCH_JITTER..GLITCH_JITTER);
            let dy = self.rng.gen_range(-GLITCH_JITTER..GLITCH_JITTER);
            surface.translate(dx, dy);
        }

        let bins = frame.frequency_bins.len().max(1);
        let bar_width = (width / bins as f32) * 2.5;
        let mut x = 0.0;
        for (i, &level) in frame.frequency_bins.iter().enumerate() {
            let bar_height = level as f32 / 255.0 * height;
            let color = Hsla::new(hue_base + i as f32, 1.0, 0.6, 1.0);
            surface.fill_rect(x, height - bar_height, bar_width, bar_height, color);
            x += bar_width + 1.0;
        }

        let slice = width / frame.time_samples.len().max(1) as f32;
        let points: Vec<(f32, f32)> = frame
            .time_samples
            .iter()
            .enumerate()
            .map(|(i, &b)| (i as f32 * slice, b as f32 / 128.0 * height / 2.0))
            .collect();
        surface.polyline(&points, 2.0, Hsla::white(0.8));

        let center = (width / 2.0, height / 2.0);
        let mean_level = if frame.frequency_bins.is_empty() {
            0.0
        } else {
            frame.frequency_bins.iter().map(|&b| b as f32).sum::<f32>() / bins as f32
        };
        let glow_radius = mean_level / 255.0 * height.min(width) / 2.0;
        if glow_radius > 0.0 {
            surface.radial_glow(center, glow_radius, Hsla::new(hue_base, 1.0, 0.7, 0.3));
        }

        self.particles.tick(center, &mut self.rng);
        self.particles.draw(surface);

        if glitch {
            surface.reset_transform();
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

/// One visualizer tick's worth of work, run by the session's display task.
pub struct VisualLoop {
    analysis_rx: Consumer<f32>,
    frame_tx: Producer<DisplayList>,
    analyser: Analyser,
    visualizer: Visualizer,
    params: Arc<SharedVisualParams>,
    size: (f32, f32),
    scratch: Vec<f32>,
}

impl VisualLoop {
    pub fn new(
        config: &VisualConfig,
        analysis_rx: Consumer<f32>,
        frame_tx: Producer<DisplayList>,
        params: Arc<SharedVisualParams>,
    ) -> Self {
        Self {
            analysis_rx,
            frame_tx,
            analyser: Analyser::new(config.fft_size),
            visualizer: Visualizer::new(config),
            params,
            size: (config.width, config.height),
            scratch: Vec::with_capacity(config.fft_size),
        }
    }

    /// Pull the newest gated samples, render a frame and publish it.
    pub fn tick(&mut self) -> ControlFlow<()> {
        if self.frame_tx.is_abandoned() {
            // Nobody left to show frames to
            return ControlFlow::Break(());
        }

        self.scratch.clear();
        while let Ok(sample) = self.analysis_rx.pop() {
            self.scratch.push(sample);
        }
        self.analyser.push_samples(&self.scratch);

        let frame = self.analyser.snapshot();
        let mut list = DisplayList::new(self.size.0, self.size.1);
        self.visualizer.render(&frame, self.params.load(), &mut list);

        if self.frame_tx.push(list).is_err() {
            trace!("display frame dropped, host not keeping up");
        }
        ControlFlow::Continue(())
    }
}
