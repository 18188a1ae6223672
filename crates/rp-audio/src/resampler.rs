//! Audio resampling
//!
//! Converts interleaved stereo audio from the core's input rate to the
//! driver's output rate. The ratio is passed on every call so rate control
//! can nudge it without rebuilding the resampler.

use rp_core::AudioError;
use std::f32::consts::PI;

const CHANNELS: usize = 2;

/// Frames kept behind the read position for interpolation
const HISTORY_FRAMES: usize = 4;

/// Audio resampler quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplerQuality {
    /// Low quality, fast (linear interpolation)
    Low,
    /// Medium quality (4-point interpolation)
    Medium,
    /// High quality (sinc interpolation)
    High,
}

impl ResamplerQuality {
    /// Frames needed after the read position
    fn lookahead(&self) -> usize {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 4,
        }
    }
}

/// Audio resampler
#[derive(Debug, Clone)]
pub struct Resampler {
    ident: &'static str,
    quality: ResamplerQuality,
    /// Pending interleaved input
    input_buffer: Vec<f32>,
    /// Read position in frames, relative to `input_buffer`
    position: f64,
}

impl Resampler {
    /// Names accepted by [`Resampler::by_name`]
    pub const NAMES: [&'static str; 3] = ["linear", "cc", "sinc"];

    /// Look up a resampler by its configured name (case-insensitive).
    pub fn by_name(name: &str) -> Result<Self, AudioError> {
        let (ident, quality) = match name.to_ascii_lowercase().as_str() {
            "linear" | "nearest" => ("linear", ResamplerQuality::Low),
            "cc" | "cubic" => ("cc", ResamplerQuality::Medium),
            "sinc" => ("sinc", ResamplerQuality::High),
            _ => return Err(AudioError::UnknownResampler(name.to_string())),
        };
        tracing::debug!("Using resampler \"{}\"", ident);
        Ok(Self::with_quality(ident, quality))
    }

    fn with_quality(ident: &'static str, quality: ResamplerQuality) -> Self {
        Self {
            ident,
            quality,
            input_buffer: Vec::new(),
            position: 0.0,
        }
    }

    pub fn ident(&self) -> &'static str {
        self.ident
    }

    pub fn quality(&self) -> ResamplerQuality {
        self.quality
    }

    /// Resample `input` by `ratio` (output rate / input rate), appending to `output`.
    pub fn process(&mut self, input: &[f32], ratio: f64, output: &mut Vec<f32>) -> Result<(), AudioError> {
        if input.len() % CHANNELS != 0 {
            return Err(AudioError::ChannelLayout(input.len()));
        }
        if ratio <= 0.0 {
            return Ok(());
        }

        self.input_buffer.extend_from_slice(input);

        let step = 1.0 / ratio;
        let frames = self.input_buffer.len() / CHANNELS;
        let lookahead = self.quality.lookahead();

        output.reserve(((input.len() / CHANNELS) as f64 * ratio) as usize * CHANNELS + CHANNELS);

        while (self.position.floor() as usize) + lookahead < frames {
            match self.quality {
                ResamplerQuality::Low => self.resample_linear(self.position, output),
                ResamplerQuality::Medium => self.resample_cubic(self.position, output),
                ResamplerQuality::High => self.resample_sinc(self.position, output),
            }
            self.position += step;
        }

        // Drop consumed frames, keeping a little history for interpolation
        let consumed = (self.position.floor() as usize).saturating_sub(HISTORY_FRAMES);
        if consumed > 0 {
            self.input_buffer.drain(..consumed * CHANNELS);
            self.position -= consumed as f64;
        }

        Ok(())
    }

    fn frame(&self, idx: usize, ch: usize) -> f32 {
        self.input_buffer[idx * CHANNELS + ch]
    }

    /// Linear interpolation resampling
    fn resample_linear(&self, pos: f64, output: &mut Vec<f32>) {
        let idx0 = pos.floor() as usize;
        let idx1 = idx0 + 1;
        let frac = (pos - idx0 as f64) as f32;

        for ch in 0..CHANNELS {
            let sample0 = self.frame(idx0, ch);
            let sample1 = self.frame(idx1, ch);
            output.push(sample0 + (sample1 - sample0) * frac);
        }
    }

    /// Cubic interpolation resampling (4-point)
    fn resample_cubic(&self, pos: f64, output: &mut Vec<f32>) {
        let idx = pos.floor() as usize;
        let frac = (pos - idx as f64) as f32;

        for ch in 0..CHANNELS {
            let y0 = self.frame(idx.saturating_sub(1), ch);
            let y1 = self.frame(idx, ch);
            let y2 = self.frame(idx + 1, ch);
            let y3 = self.frame(idx + 2, ch);

            // Catmull-Rom
            let a = -0.5 * y0 + 1.5 * y1 - 1.5 * y2 + 0.5 * y3;
            let b = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
            let c = -0.5 * y0 + 0.5 * y2;
            let d = y1;

            output.push(((a * frac + b) * frac + c) * frac + d);
        }
    }

    /// Windowed sinc resampling
    fn resample_sinc(&self, pos: f64, output: &mut Vec<f32>) {
        const TAPS: usize = 8;
        const HALF_TAPS: i64 = (TAPS / 2) as i64;

        let idx = pos.floor() as i64;
        let frac = (pos - idx as f64) as f32;

        for ch in 0..CHANNELS {
            let mut sum = 0.0;
            let mut weight_sum = 0.0;

            for i in (1 - HALF_TAPS)..=HALF_TAPS {
                let sample_idx = (idx + i).max(0) as usize;
                let x = i as f32 - frac;

                let sinc_val = if x.abs() < 0.001 {
                    1.0
                } else {
                    let pi_x = PI * x;
                    (pi_x.sin() / pi_x) * (0.5 + 0.5 * (PI * x / HALF_TAPS as f32).cos())
                };

                sum += self.frame(sample_idx, ch) * sinc_val;
                weight_sum += sinc_val;
            }

            output.push(if weight_sum.abs() > f32::EPSILON { sum / weight_sum } else { 0.0 });
        }
    }

    /// Reset the resampler state
    pub fn reset(&mut self) {
        self.input_buffer.clear();
        self.position = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> Vec<f32> {
        (0..frames).flat_map(|i| {
            let v = i as f32 / frames as f32;
            [v, -v]
        }).collect()
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Resampler::by_name("SINC").unwrap().quality(), ResamplerQuality::High);
        assert_eq!(Resampler::by_name("CC").unwrap().ident(), "cc");
        assert!(matches!(
            Resampler::by_name("bogus"),
            Err(AudioError::UnknownResampler(_))
        ));
    }

    #[test]
    fn test_rejects_odd_sample_count() {
        let mut r = Resampler::by_name("linear").unwrap();
        let mut out = Vec::new();
        assert!(r.process(&[0.0; 3], 1.0, &mut out).is_err());
    }

    #[test]
    fn test_unity_ratio_keeps_frame_count() {
        let mut r = Resampler::by_name("linear").unwrap();
        let mut out = Vec::new();
        let input = ramp(1000);
        r.process(&input, 1.0, &mut out).unwrap();
        let frames = out.len() / 2;
        assert!((995..=1000).contains(&frames), "frames = {}", frames);
        assert!((out[200] - input[200]).abs() < 1e-6);
    }

    #[test]
    fn test_upsampling_doubles_output() {
        for name in Resampler::NAMES {
            let mut r = Resampler::by_name(name).unwrap();
            let mut out = Vec::new();
            r.process(&ramp(1000), 2.0, &mut out).unwrap();
            let frames = out.len() / 2;
            assert!((1985..=2000).contains(&frames), "{}: frames = {}", name, frames);
        }
    }

    #[test]
    fn test_streaming_is_continuous() {
        let mut r = Resampler::by_name("cc").unwrap();
        let mut out = Vec::new();
        let input = ramp(2000);
        for chunk in input.chunks(256) {
            r.process(chunk, 0.5, &mut out).unwrap();
        }
        let frames = out.len() / 2;
        assert!((990..=1000).contains(&frames), "frames = {}", frames);
        // Left channel of a ramp stays monotonic
        let left: Vec<f32> = out.iter().step_by(2).copied().collect();
        assert!(left.windows(2).all(|w| w[1] >= w[0] - 1e-4));
    }
}
