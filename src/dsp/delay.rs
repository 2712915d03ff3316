/// Circular delay buffer sized at construction time.
///
/// The capacity is fixed when the line is built (from the longest delay the
/// caller needs at its sample rate); reads and writes never allocate.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Create a line able to hold `max_delay_samples` of history.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1) + 1],
            write_pos: 0,
        }
    }

    /// Create a line long enough for `max_seconds` at `sample_rate`.
    pub fn with_max_time(max_seconds: f32, sample_rate: f32) -> Self {
        Self::new((max_seconds * sample_rate).ceil() as usize + 1)
    }

    /// Longest delay, in samples, that can be read back.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Push one sample into the line.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read the sample written `delay_samples` writes ago.
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1, self.capacity());
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Read a fractional delay using linear interpolation.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let delay = delay_samples.clamp(1.0, self.capacity() as f32);
        let whole = delay.floor();
        let frac = delay - whole;
        let near = self.read(whole as usize);
        if frac == 0.0 {
            return near;
        }
        let far = self.read(whole as usize + 1);
        near + (far - near) * frac
    }

    /// Delay one sample: returns the sample from `delay_samples` ago, then stores `sample`.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(sample);
        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: usize) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_arrives_after_delay() {
        let mut line = DelayLine::new(16);
        let mut buffer = vec![0.0; 16];
        buffer[0] = 1.0;

        line.render(&mut buffer, 5);

        assert_eq!(buffer[5], 1.0);
        assert_eq!(buffer.iter().filter(|s| **s != 0.0).count(), 1);
    }

    #[test]
    fn test_delay_is_clamped_to_capacity() {
        let mut line = DelayLine::new(4);
        line.write(1.0);
        for _ in 0..3 {
            line.write(0.0);
        }
        // Asking for more than capacity reads the oldest retained sample
        assert_eq!(line.read(100), 1.0);
    }

    #[test]
    fn test_interpolated_read_between_samples() {
        let mut line = DelayLine::new(8);
        line.write(0.0);
        line.write(1.0);
        // delay 1 -> 1.0, delay 2 -> 0.0
        let half = line.read_interpolated(1.5);
        assert!((half - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_with_max_time_capacity() {
        let line = DelayLine::with_max_time(1.0, 48_000.0);
        assert!(line.capacity() >= 48_000);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut line = DelayLine::new(8);
        line.write(1.0);
        line.reset();
        for delay in 1..=8 {
            assert_eq!(line.read(delay), 0.0);
        }
    }
}
