//! Reverb - Room Simulation via Delay Networks
//!
//! Reverb simulates the sound of a space by creating many delayed, filtered
//! reflections of the input signal. This implementation puts a pre-delay in
//! front of the classic Schroeder network.
//!
//! # Architecture
//!
//! ```text
//!                          ┌──→ [Comb 1] ──┐
//!                          ├──→ [Comb 2] ──┤
//! Input ──→ [Pre-delay] ───┼──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Wet
//!                          └──→ [Comb 4] ──┘
//! ```
//!
//! ## Pre-delay
//!
//! The gap between the direct sound and the first reflections. Longer
//! pre-delay keeps the attack of a note clear of the wash that follows it.
//!
//! ## Comb Filters
//!
//! ```text
//! y[n] = x[n] + feedback * lowpass(y[n - delay])
//! ```
//!
//! The delay times are mutually prime so the echoes never line up into a
//! pitched ring.
//!
//! ## Decay Time
//!
//! Decay is specified as RT60: the time for the tail to fall by 60 dB. A comb
//! with loop delay `d` recirculates `decay / d` times in that span, so each
//! pass must attenuate by `60·d/decay` dB:
//!
//! ```text
//! g = 10^(−3·d / decay)
//! ```
//!
//! Short combs get a slightly higher feedback than long ones, which keeps all
//! four tails dying together.
//!
//! ## Allpass Filters
//!
//! ```text
//! y[n] = -g * x[n] + x[n - delay] + g * y[n - delay]
//! ```
//!
//! They smear the comb echoes into a dense tail without colouring it.

use crate::dsp::delay::DelayLine;

/// Max comb filter delay: 50ms at 192kHz = 9600 samples
const MAX_COMB_DELAY: usize = 9600;
/// Max allpass filter delay: 10ms at 192kHz = 1920 samples
const MAX_ALLPASS_DELAY: usize = 1920;
/// Longest supported pre-delay in seconds
pub const MAX_PRE_DELAY: f32 = 1.0;

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
/// Ceiling on comb feedback; above this the tail rings metallically
const MAX_COMB_FEEDBACK: f32 = 0.98;

/// A damped comb filter for reverb (pre-allocated, RT-safe)
pub struct CombFilter {
    buffer: [f32; MAX_COMB_DELAY],
    delay_samples: usize,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: [0.0; MAX_COMB_DELAY],
            delay_samples: delay_samples.clamp(1, MAX_COMB_DELAY),
            write_pos: 0,
            feedback: 0.5,
            damp: 0.2,
            filter_state: 0.0,
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_COMB_FEEDBACK);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        // One-pole lowpass in the loop absorbs highs, like air and soft walls
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;

        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.delay_samples;

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// An allpass filter for reverb diffusion (pre-allocated, RT-safe)
pub struct AllpassFilter {
    buffer: [f32; MAX_ALLPASS_DELAY],
    delay_samples: usize,
    write_pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: [0.0; MAX_ALLPASS_DELAY],
            delay_samples: delay_samples.clamp(1, MAX_ALLPASS_DELAY),
            write_pos: 0,
            feedback: 0.5,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];

        let output = -self.feedback * input + delayed;
        self.buffer[self.write_pos] = input + self.feedback * output;
        self.write_pos = (self.write_pos + 1) % self.delay_samples;

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Pre-delayed Schroeder reverb producing a 100% wet signal.
pub struct Reverb {
    pre_delay: DelayLine,
    pre_delay_samples: f32,
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
    sample_rate: f32,
    decay: f32,
}

impl Reverb {
    pub fn new(sample_rate: f32, decay: f32, pre_delay: f32) -> Self {
        let to_samples = |ms: f32| (ms * sample_rate / 1000.0) as usize;

        let mut reverb = Self {
            pre_delay: DelayLine::with_max_time(MAX_PRE_DELAY, sample_rate),
            pre_delay_samples: 0.0,
            combs: COMB_DELAYS_MS.map(|ms| CombFilter::new(to_samples(ms))),
            allpasses: ALLPASS_DELAYS_MS.map(|ms| AllpassFilter::new(to_samples(ms))),
            sample_rate,
            decay: 0.0,
        };
        reverb.set_decay(decay);
        reverb.set_pre_delay(pre_delay);
        reverb
    }

    /// Set the RT60 decay time in seconds.
    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay.max(0.01);
        for comb in &mut self.combs {
            let loop_secs = comb.delay_samples() as f32 / self.sample_rate;
            comb.set_feedback(10f32.powf(-3.0 * loop_secs / self.decay));
        }
    }

    /// Set the pre-delay in seconds.
    pub fn set_pre_delay(&mut self, seconds: f32) {
        self.pre_delay_samples = seconds.clamp(0.0, MAX_PRE_DELAY) * self.sample_rate;
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn pre_delay(&self) -> f32 {
        self.pre_delay_samples / self.sample_rate
    }

    /// Process a single sample, returning only the reverberated signal.
    pub fn process(&mut self, input: f32) -> f32 {
        let source = if self.pre_delay_samples < 1.0 {
            self.pre_delay.write(input);
            input
        } else {
            let delayed = self.pre_delay.read_interpolated(self.pre_delay_samples);
            self.pre_delay.write(input);
            delayed
        };

        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(source);
        }
        output *= 0.25; // Normalize for 4 combs

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    pub fn reset(&mut self) {
        self.pre_delay.reset();
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn first_nonzero(reverb: &mut Reverb, max: usize) -> Option<usize> {
        (0..max).find(|_| reverb.process(0.0).abs() > 1e-6)
    }

    #[test]
    fn test_comb_filter_creates_echo() {
        let mut comb = CombFilter::new(10);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);

        let out1 = comb.process(1.0);
        assert!(out1.abs() < 0.01);

        for _ in 0..9 {
            comb.process(0.0);
        }

        let echo = comb.process(0.0);
        assert!(echo.abs() > 0.4);
    }

    #[test]
    fn test_decay_sets_comb_feedback() {
        let short = Reverb::new(SAMPLE_RATE, 0.5, 0.0);
        let long = Reverb::new(SAMPLE_RATE, 9.0, 0.0);
        for (s, l) in short.combs.iter().zip(long.combs.iter()) {
            assert!(s.feedback() < l.feedback());
            assert!(l.feedback() <= MAX_COMB_FEEDBACK);
        }
        // 29.7 ms loop at RT60 = 6 s -> 10^(-3 * 0.0297 / 6)
        let six = Reverb::new(SAMPLE_RATE, 6.0, 0.0);
        assert!((six.combs[0].feedback() - 0.9664).abs() < 1e-3);
    }

    #[test]
    fn test_pre_delay_postpones_tail() {
        let mut none = Reverb::new(SAMPLE_RATE, 2.0, 0.0);
        none.process(1.0);
        let onset_none = first_nonzero(&mut none, 20_000).unwrap();

        let mut late = Reverb::new(SAMPLE_RATE, 2.0, 0.1);
        late.process(1.0);
        let onset_late = first_nonzero(&mut late, 20_000).unwrap();

        let gap = onset_late - onset_none;
        assert!(
            (4700..=4900).contains(&gap),
            "100 ms pre-delay moved onset by {gap} samples"
        );
    }

    #[test]
    fn test_longer_decay_keeps_more_energy() {
        let tail_energy = |decay: f32| {
            let mut reverb = Reverb::new(SAMPLE_RATE, decay, 0.0);
            reverb.process(1.0);
            (0..48_000)
                .map(|i| {
                    let out = reverb.process(0.0);
                    if i > 24_000 {
                        out * out
                    } else {
                        0.0
                    }
                })
                .sum::<f32>()
        };
        assert!(tail_energy(8.0) > tail_energy(0.5) * 10.0);
    }

    #[test]
    fn test_reverb_stability() {
        let mut reverb = Reverb::new(SAMPLE_RATE, 10.0, 1.0);

        for _ in 0..100_000 {
            let out = reverb.process(0.1);
            assert!(out.is_finite(), "Reverb output should be finite");
            assert!(out.abs() < 10.0, "Reverb output unstable: {}", out);
        }
    }
}
