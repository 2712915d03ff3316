//! Signal summing and dry/wet blending primitives.

/*
Mixing
======

  summing       Adding signals at their own levels. The output mixer does this
                with the dry path and the distortion path; their levels are
                set upstream by gains, not by the mixer.

  wet/dry       Effect blending with complementary weights:

                    output = dry × (1 - mix) + wet × mix

                The reverb uses this with its own wet ratio, independent of
                the output mixer.

Clipping Risk
-------------

Summing never normalizes. Two paths that each peak at 1.0 can sum to 2.0;
the master gain after the mixer is where the level is brought back down.
*/

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Blend dry and wet samples using linear crossfade (single sample version).
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Apply dry/wet mixing to a buffer, blending original (dry) with processed (wet).
///
/// Modifies `wet` in-place, using `dry` as the unprocessed reference.
#[inline]
pub fn apply_dry_wet(dry: &[f32], wet: &mut [f32], mix: f32) {
    debug_assert_eq!(dry.len(), wet.len());

    if mix >= 1.0 {
        return; // 100% wet, nothing to do
    }

    for (wet_sample, &dry_sample) in wet.iter_mut().zip(dry.iter()) {
        *wet_sample = blend_dry_wet(dry_sample, *wet_sample, mix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_can_exceed_one() {
        let mut a = [1.0, 0.5];
        let b = [1.0, 0.8];

        sum_in_place(&mut a, &b);

        assert_eq!(a[0], 2.0);
        assert_eq!(a[1], 1.3);
    }

    #[test]
    fn test_blend_dry_wet() {
        assert_eq!(blend_dry_wet(1.0, 0.5, 0.0), 1.0);
        assert_eq!(blend_dry_wet(1.0, 0.5, 1.0), 0.5);
        assert_eq!(blend_dry_wet(1.0, 0.0, 0.5), 0.5);
    }

    #[test]
    fn test_apply_dry_wet_all_dry() {
        let dry = [1.0, 0.5, -0.5, -1.0];
        let mut wet = [0.0, 0.0, 0.0, 0.0];

        apply_dry_wet(&dry, &mut wet, 0.0);

        assert_eq!(wet, dry);
    }

    #[test]
    fn test_apply_dry_wet_all_wet() {
        let dry = [0.0, 0.0, 0.0, 0.0];
        let mut wet = [1.0, 0.5, -0.5, -1.0];
        let original = wet;

        apply_dry_wet(&dry, &mut wet, 1.0);

        assert_eq!(wet, original);
    }
}
