//! Audio input rate and vsync policy
//!
//! Cores run at their own frame rate, which rarely matches the display
//! exactly. When the two are close, audio is resampled as if the core ran
//! at the display's rate so that video can stay in sync without audio
//! underruns. When they are too far apart, no adjustment is made, and a
//! core faster than the display cannot rely on vsync at all.

use rp_core::SystemTiming;

/// Largest relative difference between core and display rate that is
/// compensated by resampling
pub const MAX_TIMING_SKEW: f64 = 0.05;

/// Outcome of comparing core timing with the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDecision {
    /// Rate the core's audio is treated as having, in Hz
    pub input_rate: f64,
    /// Vsync cannot keep up with the core
    pub force_nonblock: bool,
}

/// Decide the audio input rate for `timing` on a display refreshing at
/// `refresh_rate` Hz. `None` if the core has not reported usable timing.
pub fn compute_input_rate(timing: &SystemTiming, refresh_rate: f64) -> Option<RateDecision> {
    if !timing.is_valid() || refresh_rate <= 0.0 {
        return None;
    }

    let skew = (1.0 - timing.fps / refresh_rate).abs();
    let decision = if skew > MAX_TIMING_SKEW {
        tracing::info!(
            "Timings deviate too much. Will not adjust. (Display = {:.2} Hz, Game = {:.2} Hz)",
            refresh_rate,
            timing.fps
        );
        let force_nonblock = timing.fps > refresh_rate;
        if force_nonblock {
            tracing::info!("Game FPS > Monitor FPS. Cannot rely on VSync.");
        }
        RateDecision {
            input_rate: timing.sample_rate,
            force_nonblock,
        }
    } else {
        RateDecision {
            input_rate: timing.sample_rate * (refresh_rate / timing.fps),
            force_nonblock: false,
        }
    };

    tracing::info!("Set audio input rate to: {:.2} Hz.", decision.input_rate);
    Some(decision)
}

/// Resampling ratio from `input_rate` to `output_rate`
pub fn source_ratio(output_rate: u32, input_rate: f64) -> f64 {
    output_rate as f64 / input_rate
}

/// Resampling ratio nudged by the backend's buffer fill level.
///
/// A buffer more than half free speeds production up, a fuller one slows
/// it down, by at most `delta` relative to `orig_ratio`.
pub fn rate_controlled_ratio(orig_ratio: f64, delta: f64, write_avail: usize, buffer_size: usize) -> f64 {
    let half = buffer_size as f64 / 2.0;
    if half <= 0.0 {
        return orig_ratio;
    }
    let direction = (write_avail as f64 - half) / half;
    orig_ratio * (1.0 + delta * direction)
}
