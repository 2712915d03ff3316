//! Spectrum and waveform snapshots of the gated input.
//!
//! FFT-based, byte-scaled the way browser analysers report their data:
//! frequency magnitudes are smoothed over time, converted to dB and mapped
//! from `[MIN_DB, MAX_DB]` onto `0..=255`; time-domain samples are mapped
//! so silence reads 128.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::{dsp::analysis::sample_to_byte, visual::VisualFrame};

/// Magnitude mapped to byte 0.
pub const MIN_DB: f32 = -100.0;
/// Magnitude mapped to byte 255.
pub const MAX_DB: f32 = -30.0;
/// Weight of the previous frame in the magnitude average.
pub const SMOOTHING: f32 = 0.8;

pub struct Analyser {
    /// Most recent `fft_size` samples, oldest first once unrolled
    history: Vec<f32>,
    write_pos: usize,
    /// Hann window coefficients
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl Analyser {
    /// `fft_size` must be a power of two.
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Hann window - reduces spectral leakage
        let denom = (fft_size - 1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos()))
            .collect();

        Self {
            history: vec![0.0; fft_size],
            write_pos: 0,
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.history.len()
    }

    /// Number of frequency bins (and time samples) per frame.
    pub fn bin_count(&self) -> usize {
        self.history.len() / 2
    }

    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.history.len();
        }
    }

    /// `i`-th sample of the history, oldest first.
    fn sample(&self, i: usize) -> f32 {
        self.history[(self.write_pos + i) % self.history.len()]
    }

    /// Take a frame. Also advances the magnitude smoothing by one step.
    pub fn snapshot(&mut self) -> VisualFrame {
        let n = self.history.len();
        for i in 0..n {
            self.scratch[i] = Complex::new(self.sample(i) * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let bins = self.bin_count();
        let mut frequency_bins = Vec::with_capacity(bins);
        for k in 0..bins {
            let magnitude = self.scratch[k].norm() / n as f32;
            let smoothed = SMOOTHING * self.smoothed[k] + (1.0 - SMOOTHING) * magnitude;
            self.smoothed[k] = smoothed;
            frequency_bins.push(db_to_byte(20.0 * smoothed.max(1e-12).log10()));
        }

        let time_samples = (n - bins..n).map(|i| sample_to_byte(self.sample(i))).collect();

        VisualFrame {
            frequency_bins,
            time_samples,
        }
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.smoothed.fill(0.0);
        self.write_pos = 0;
    }
}

fn db_to_byte(db: f32) -> u8 {
    let scaled = 255.0 * (db - MIN_DB) / (MAX_DB - MIN_DB);
    scaled.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_frame_sizes() {
        let mut analyser = Analyser::new(1024);
        let frame = analyser.snapshot();
        assert_eq!(frame.frequency_bins.len(), 512);
        assert_eq!(frame.time_samples.len(), 512);
    }

    #[test]
    fn test_silence_frame() {
        let mut analyser = Analyser::new(256);
        analyser.push_samples(&[0.0; 256]);
        let frame = analyser.snapshot();
        assert!(frame.frequency_bins.iter().all(|&b| b == 0));
        assert!(frame.time_samples.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyser = Analyser::new(1024);
        // Bin 64 of a 1024-point FFT
        let samples: Vec<f32> = (0..1024)
            .map(|i| 0.5 * (TAU * 64.0 * i as f32 / 1024.0).sin())
            .collect();
        analyser.push_samples(&samples);

        let mut frame = analyser.snapshot();
        for _ in 0..20 {
            frame = analyser.snapshot();
        }

        let (peak, _) = frame
            .frequency_bins
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .unwrap();
        assert!((63..=65).contains(&peak), "peak at {peak}");
        assert!(frame.frequency_bins[peak] > 200);
    }

    #[test]
    fn test_time_samples_are_most_recent() {
        let mut analyser = Analyser::new(64);
        analyser.push_samples(&[0.0; 64]);
        analyser.push_samples(&[1.0; 32]);
        let frame = analyser.snapshot();
        assert!(frame.time_samples.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_db_mapping_clamps() {
        assert_eq!(db_to_byte(-200.0), 0);
        assert_eq!(db_to_byte(0.0), 255);
        assert_eq!(db_to_byte(-65.0), 127);
    }
}
