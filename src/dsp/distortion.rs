//! Distortion curve synthesis and waveshaper lookup.
//!
//! The distortion stage is a table-driven waveshaper: a transfer curve is
//! computed once from a single drive value, then every sample is mapped
//! through it by table lookup.
//!
//! # The Transfer Function
//!
//! For table index `i` in `[0, N)`, the input amplitude it represents is
//!
//! ```text
//! x = 2·i / N − 1                      (covers [-1, 1))
//! curve[i] = (3 + k) · x · 20π / (π + k·|x|)
//! ```
//!
//! where `k` is the drive.
//!
//! ```text
//!   out
//!    ▲            k = 800 ─────────────────
//!    │         ╭──────────────────────────
//!    │      ╭──╯ k = 50
//!    │    ╭─╯ ╭────────────────────────
//!    │  ╭─╯ ╭─╯
//!    │ ╱  ╭─╯     k = 0 (straight line, slope 60)
//!    │╱ ╭─╯
//!  ──┼──────────────────────────────────▶ x
//!    0                                  1
//! ```
//!
//! - `k = 0` reduces to `60·x`: a pure gain, no distortion.
//! - Near zero the slope is `20·(3 + k)`, so drive raises small-signal gain.
//! - As `|x| → 1` the denominator grows with `k`; the output flattens toward
//!   `20π·(3 + k)/(π + k)`, which never exceeds `20π`. Higher drive means
//!   the curve reaches its ceiling sooner: harder clipping.
//!
//! The function is odd (`f(−x) = −f(x)`) and increasing, so it only adds odd
//! harmonics and never folds the waveform back on itself.
//!
//! # Table Lookup
//!
//! Lookup inverts the table's own sampling: an input `x` maps to the
//! fractional position `v = N/2 · (x + 1)` and the two neighbouring table
//! entries are linearly interpolated. Silence lands exactly on entry `N/2`,
//! whose value is 0, so the shaper adds no DC offset. Inputs at or beyond the
//! ends of the table take the end values.
//!
//! Browser waveshapers index with `(N − 1)/2 · (x + 1)` instead, which puts
//! silence half a step below entry `N/2` and biases the output by that much.

use std::f64::consts::PI;

/// Number of points in every synthesized curve.
pub const CURVE_LEN: usize = 44_100;

/// Drive substituted when a non-finite value is requested.
pub const FALLBACK_DRIVE: f32 = 50.0;

/// Immutable transfer curve for the waveshaper.
///
/// A drive change produces a whole new curve; existing curves are never
/// edited, so a reader holding one always sees a complete table.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionCurve {
    drive: f32,
    samples: Box<[f32]>,
}

impl DistortionCurve {
    /// Drive the curve was built from (after sanitizing).
    pub fn drive(&self) -> f32 {
        self.drive
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Map one input sample through the curve.
    #[inline]
    pub fn shape(&self, sample: f32) -> f32 {
        let n = self.samples.len();
        let last = n - 1;

        let v = n as f32 * 0.5 * (sample + 1.0);
        if !(v > 0.0) {
            // Also catches NaN input
            return self.samples[0];
        }
        if v >= last as f32 {
            return self.samples[last];
        }

        let index = v as usize;
        let frac = v - index as f32;
        let a = self.samples[index];
        let b = self.samples[index + 1];
        a + (b - a) * frac
    }

    /// Shape a whole buffer in place.
    pub fn shape_buffer(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.shape(*sample);
        }
    }
}

/// Value of the transfer function at amplitude `x` for drive `k`.
///
/// Evaluated in f64: near ±1 at high drive adjacent table entries differ by
/// less than the f32 rounding error of the formula itself.
#[inline]
pub fn transfer(x: f64, k: f64) -> f64 {
    (3.0 + k) * x * 20.0 * PI / (PI + k * x.abs())
}

/// Build the transfer curve for `drive`.
///
/// Non-finite drive falls back to [`FALLBACK_DRIVE`]. Negative drive is
/// treated as zero, the linear end of the family; below `-π` the formula
/// would otherwise divide by zero.
pub fn synthesize(drive: f32) -> DistortionCurve {
    let k = if drive.is_finite() {
        drive.max(0.0)
    } else {
        FALLBACK_DRIVE
    };

    let n = CURVE_LEN as f64;
    let samples: Box<[f32]> = (0..CURVE_LEN)
        .map(|i| {
            let x = (i as f64 * 2.0) / n - 1.0;
            transfer(x, k as f64) as f32
        })
        .collect();

    DistortionCurve { drive: k, samples }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRIVES: [f32; 6] = [0.0, 1.0, 50.0, 200.0, 400.0, 800.0];

    #[test]
    fn test_curve_has_fixed_resolution() {
        assert_eq!(synthesize(400.0).len(), CURVE_LEN);
        assert_eq!(synthesize(0.0).len(), CURVE_LEN);
    }

    #[test]
    fn test_curve_is_odd_about_midpoint() {
        for drive in DRIVES {
            let curve = synthesize(drive);
            let s = curve.samples();
            // Index i and N-1-i sit 2/N apart from exact mirror images, so
            // allow the steepest slope (at x = 0) times that offset.
            let tolerance = 20.0 * (3.0 + drive) * 2.0 / CURVE_LEN as f32 + 1e-3;
            for i in (0..CURVE_LEN).step_by(97) {
                let mirrored = s[CURVE_LEN - 1 - i];
                assert!(
                    (mirrored + s[i]).abs() <= tolerance,
                    "drive {drive}, i {i}: {} vs {}",
                    s[i],
                    mirrored
                );
            }
        }
    }

    #[test]
    fn test_curve_is_monotonic() {
        for drive in DRIVES {
            let curve = synthesize(drive);
            for pair in curve.samples().windows(2) {
                assert!(pair[1] >= pair[0], "drive {drive}: {} > {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_output_never_exceeds_ceiling() {
        let ceiling = (20.0 * PI) as f32 + 1e-3;
        for drive in DRIVES {
            let curve = synthesize(drive);
            let peak = curve.samples().iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
            assert!(peak <= ceiling, "drive {drive} peaked at {peak}");
        }
    }

    #[test]
    fn test_higher_drive_compresses_extremes() {
        // Ratio of the edge value to the small-signal value shrinks as drive rises
        let compression = |k: f32| transfer(0.99, k as f64) / transfer(0.01, k as f64);
        let mut previous = compression(0.0);
        for drive in &DRIVES[1..] {
            let current = compression(*drive);
            assert!(current < previous, "drive {drive}: {current} >= {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_zero_drive_is_linear() {
        let curve = synthesize(0.0);
        for &x in &[-0.9, -0.3, 0.0, 0.25, 0.8] {
            let expected = 60.0 * x;
            assert!((curve.shape(x) - expected).abs() < 1e-2, "x {x}");
        }
    }

    #[test]
    fn test_negative_drive_behaves_like_zero() {
        let curve = synthesize(-500.0);
        assert_eq!(curve.drive(), 0.0);
        assert!(curve.samples().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_non_finite_drive_uses_fallback() {
        assert_eq!(synthesize(f32::NAN).drive(), FALLBACK_DRIVE);
        assert_eq!(synthesize(f32::INFINITY).drive(), FALLBACK_DRIVE);
        assert_eq!(synthesize(f32::NAN), synthesize(FALLBACK_DRIVE));
    }

    #[test]
    fn test_shape_matches_transfer_function() {
        let curve = synthesize(400.0);
        for &x in &[-0.75, -0.1, 0.05, 0.5, 0.9] {
            let expected = transfer(x as f64, 400.0) as f32;
            let got = curve.shape(x);
            assert!(
                (got - expected).abs() <= expected.abs() * 0.01 + 0.5,
                "x {x}: got {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_silence_maps_to_zero() {
        for drive in DRIVES {
            assert_eq!(synthesize(drive).shape(0.0), 0.0, "drive {drive}");
        }
    }

    #[test]
    fn test_shape_clamps_out_of_range_input() {
        let curve = synthesize(200.0);
        let s = curve.samples();
        assert_eq!(curve.shape(5.0), s[CURVE_LEN - 1]);
        assert_eq!(curve.shape(-5.0), s[0]);
        assert_eq!(curve.shape(f32::NAN), s[0]);
    }
}
