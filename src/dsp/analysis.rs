//! Level measurement helpers shared by the gate and the display.
//!
//! Monitor taps deliver unsigned 8-bit snapshots, the same resolution a
//! browser analyser exposes: silence is 128, full scale is 0 and 255.

/// Byte value representing zero amplitude.
pub const BYTE_MIDPOINT: f32 = 128.0;

/// Quantize one sample to an unsigned byte, centred on 128.
#[inline]
pub fn sample_to_byte(sample: f32) -> u8 {
    (BYTE_MIDPOINT * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
}

/// Map a byte back into the signed [-1, 1) range.
#[inline]
pub fn byte_to_sample(byte: u8) -> f32 {
    (byte as f32 - BYTE_MIDPOINT) / BYTE_MIDPOINT
}

/// Quantize a block of samples. Writes `min(input.len(), out.len())` bytes.
pub fn to_bytes(input: &[f32], out: &mut [u8]) {
    for (byte, &sample) in out.iter_mut().zip(input.iter()) {
        *byte = sample_to_byte(sample);
    }
}

/// Root-mean-square of a float block.
pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt()
}

/// Root-mean-square of a byte block after recentering.
pub fn byte_rms(bytes: &[u8]) -> f32 {
    if bytes.is_empty() {
        return 0.0;
    }
    let sum: f32 = bytes
        .iter()
        .map(|&b| {
            let v = byte_to_sample(b);
            v * v
        })
        .sum();
    (sum / bytes.len() as f32).sqrt()
}

/// Absolute peak of a float block.
pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}
