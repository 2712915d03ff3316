use crate::graph::node::RenderCtx;

/*
Linear Parameter Ramp
=====================

A gain that jumps from one value to another between two samples produces a
step in the waveform, which is heard as a click. A ramp spreads the change
over a fixed time instead.

  Value
   1.0 ┤          ╭────────────   target = 1.0, ramp = 10 ms
       │         ╱
       │        ╱
   0.0 ┼───────╯
       └───────┬──┬────────────→ Time
            command  +10 ms

The Math
--------

When a new target arrives, the per-sample step is fixed once:

    increment = (target - current) / (ramp_seconds * sample_rate)

and every sample moves the value by that increment until it would pass the
target, at which point it lands exactly on the target. The value therefore
never overshoots and always arrives within the ramp time.

Re-commanding
-------------

A controller that re-sends the same target every tick (the noise gate does
this) must not restart the ramp each time: restarting from the current value
with the full ramp time would shrink the step on every tick and the value
would creep toward the target without ever reaching it. A command whose
target equals the current target is therefore ignored.
*/

pub struct LinearRamp {
    value: f32,
    target: f32,
    increment: f32,
    // Counting samples instead of comparing floats guarantees arrival on time
    remaining: u32,
}

impl LinearRamp {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            increment: 0.0,
            remaining: 0,
        }
    }

    /// Start moving toward `target`, arriving after `ramp_secs`.
    pub fn ramp_to(&mut self, target: f32, ramp_secs: f32, ctx: &RenderCtx) {
        if target == self.target {
            return;
        }
        self.target = target;

        let samples = (ramp_secs.max(0.0) * ctx.sample_rate).round();
        if samples < 1.0 {
            self.value = target;
            self.increment = 0.0;
            self.remaining = 0;
        } else {
            self.remaining = samples as u32;
            self.increment = (target - self.value) / samples;
        }
    }

    /// Jump straight to `value`, cancelling any ramp in progress.
    pub fn set_immediate(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.increment = 0.0;
        self.remaining = 0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.value = if self.remaining == 0 {
                self.target
            } else if self.increment > 0.0 {
                (self.value + self.increment).min(self.target)
            } else {
                (self.value + self.increment).max(self.target)
            };
        }
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::new(SAMPLE_RATE)
    }

    fn samples_for(ms: f32) -> usize {
        (ms / 1000.0 * SAMPLE_RATE) as usize
    }

    #[test]
    fn test_arrives_within_ramp_time() {
        let mut ramp = LinearRamp::new(1.0);
        ramp.ramp_to(0.0, 0.05, &ctx());

        for _ in 0..samples_for(50.0) {
            ramp.next_sample();
        }

        assert_eq!(ramp.value(), 0.0);
        assert!(!ramp.is_ramping());
    }

    #[test]
    fn test_never_overshoots() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.ramp_to(1.0, 0.01, &ctx());

        let mut previous = 0.0;
        for _ in 0..samples_for(20.0) {
            let value = ramp.next_sample();
            assert!(value <= 1.0);
            assert!(value >= previous);
            previous = value;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_repeated_command_does_not_restart() {
        let mut ramp = LinearRamp::new(1.0);
        // Re-send the same target every 16 ms, as a polling controller would
        for _ in 0..4 {
            ramp.ramp_to(0.0, 0.05, &ctx());
            for _ in 0..samples_for(16.0) {
                ramp.next_sample();
            }
        }
        // 64 ms elapsed, well past the 50 ms ramp
        assert_eq!(ramp.value(), 0.0);
    }

    #[test]
    fn test_reversal_mid_ramp() {
        let mut ramp = LinearRamp::new(1.0);
        ramp.ramp_to(0.0, 0.05, &ctx());
        for _ in 0..samples_for(25.0) {
            ramp.next_sample();
        }
        let midway = ramp.value();
        assert!(midway > 0.4 && midway < 0.6, "midway {midway}");

        ramp.ramp_to(1.0, 0.01, &ctx());
        for _ in 0..samples_for(10.0) {
            ramp.next_sample();
        }
        assert_eq!(ramp.value(), 1.0);
    }

    #[test]
    fn test_zero_time_ramp_jumps() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.ramp_to(0.7, 0.0, &ctx());
        assert_eq!(ramp.value(), 0.7);
        assert_eq!(ramp.next_sample(), 0.7);
    }
}
