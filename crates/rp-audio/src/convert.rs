//! Sample format conversion

/// Convert signed 16-bit samples to float, scaled by `gain`.
pub fn s16_to_float(input: &[i16], gain: f32, output: &mut Vec<f32>) {
    let scale = gain / 32768.0;
    output.extend(input.iter().map(|&s| s as f32 * scale));
}

/// Convert float samples back to signed 16-bit with clamping.
pub fn float_to_s16(input: &[f32], output: &mut Vec<i16>) {
    output.extend(input.iter().map(|&s| {
        let v = (s * 32768.0).round();
        v.clamp(i16::MIN as f32, i16::MAX as f32) as i16
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s16_to_float() {
        let mut out = Vec::new();
        s16_to_float(&[0, 16384, -32768], 1.0, &mut out);
        assert_eq!(out, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_float_to_s16_clamps() {
        let mut out = Vec::new();
        float_to_s16(&[0.5, 2.0, -2.0], &mut out);
        assert_eq!(out, vec![16384, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_gain() {
        let mut out = Vec::new();
        s16_to_float(&[16384], 0.0, &mut out);
        assert_eq!(out, vec![0.0]);
    }
}
