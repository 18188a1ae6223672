//! Audio path
//!
//! Samples from the core are converted to float, resampled from the input
//! rate to the backend's output rate and written in chunks. With rate
//! control the resampling ratio follows the backend's buffer fill level so
//! the buffer hovers around half full.

use crate::context::RuntimeContext;
use crate::nonblock::chunk_size;
use crate::rates::{rate_controlled_ratio, source_ratio};
use crate::slot::ActiveDriver;
use rp_audio::convert::{float_to_s16, s16_to_float};
use rp_audio::{
    AudioDriver, AudioInitParams, Resampler, Samples, ThreadedAudio, AUDIO_CHUNK_SIZE_BLOCKING,
    AUDIO_CHUNK_SIZE_NONBLOCKING,
};
use rp_core::{Capabilities, Descriptor, DriverCategory, DriverError};

/// Conversion state of the active audio backend
#[derive(Debug, Default)]
pub struct AudioPath {
    /// Audio is enabled and the backend and resampler are usable
    pub(crate) active: bool,
    pub(crate) use_float: bool,
    /// Samples written per flush
    pub(crate) chunk_size: usize,
    pub(crate) rate_control: bool,
    /// Backend buffer size in samples, valid with rate control
    pub(crate) driver_buffer_size: usize,
    pub(crate) gain: f32,
    pub(crate) resampler: Option<Resampler>,
    float_buf: Vec<f32>,
    resampled: Vec<f32>,
    s16_buf: Vec<i16>,
}

impl AudioPath {
    fn allocate(&mut self, max_samples: usize) {
        self.float_buf = Vec::with_capacity(max_samples);
        self.resampled = Vec::with_capacity(max_samples * rp_audio::AUDIO_MAX_RATIO);
        self.s16_buf = Vec::with_capacity(max_samples * rp_audio::AUDIO_MAX_RATIO);
    }

    fn release(&mut self) {
        self.resampler = None;
        self.float_buf = Vec::new();
        self.resampled = Vec::new();
        self.s16_buf = Vec::new();
    }

    pub fn use_float(&self) -> bool {
        self.use_float
    }

    pub fn rate_control(&self) -> bool {
        self.rate_control
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl RuntimeContext {
    pub fn audio_path(&self) -> &AudioPath {
        &self.audio_path
    }

    /// Open the audio backend. Does nothing if one is already open.
    ///
    /// A backend that fails to open or an unknown resampler only disables
    /// audio. Errors are returned for an empty registry and for a threaded
    /// wrapper that cannot be started.
    pub fn init_audio(&mut self) -> Result<(), DriverError> {
        if self.audio.is_some() {
            return Ok(());
        }

        // Room for two full non-blocking chunks
        self.audio_path.allocate(AUDIO_CHUNK_SIZE_NONBLOCKING * 2);
        self.audio_path.chunk_size = AUDIO_CHUNK_SIZE_BLOCKING;

        if !self.config.audio.enable {
            self.audio_path.active = false;
            return Ok(());
        }

        self.begin_init(DriverCategory::Audio);
        let cfg = self.config.audio.clone();
        let descriptor = match self.registries.audio.select(&cfg.driver) {
            Ok(descriptor) => descriptor.clone(),
            Err(e) => {
                self.end_init(DriverCategory::Audio, false);
                return Err(e);
            }
        };

        let params = AudioInitParams {
            device: (!cfg.device.is_empty()).then(|| cfg.device.clone()),
            rate: cfg.out_rate,
            latency: cfg.latency,
        };
        let Some(driver) = descriptor.init(&params) else {
            tracing::error!("Failed to initialize audio driver. Will continue without audio.");
            self.audio_path.active = false;
            self.end_init(DriverCategory::Audio, false);
            return Ok(());
        };

        let driver: Box<dyn AudioDriver> = match self.system.audio_callback.clone() {
            Some(callback) => {
                tracing::info!("Starting threaded audio driver ...");
                match ThreadedAudio::new(driver, callback) {
                    Ok(threaded) => Box::new(threaded),
                    Err(e) => {
                        tracing::error!("Cannot open threaded audio driver: {}", e);
                        self.end_init(DriverCategory::Audio, false);
                        return Err(DriverError::ThreadedInitFailed(DriverCategory::Audio));
                    }
                }
            }
            None => driver,
        };

        let caps = descriptor.capabilities();
        let mut audio = ActiveDriver::owned(descriptor.ident(), caps, driver);
        let path = &mut self.audio_path;
        path.active = true;
        path.gain = if cfg.mute { 0.0 } else { 1.0 };
        path.use_float = caps.contains(Capabilities::FLOAT_AUDIO) && audio.with(|a| a.use_float());

        if !cfg.sync {
            audio.with(|a| a.set_nonblock_state(true));
            path.chunk_size = chunk_size(true);
        }

        if self.timing.input_rate <= 0.0 {
            tracing::warn!(
                "Input rate is invalid ({:.3} Hz). Using output rate ({} Hz).",
                self.timing.input_rate,
                cfg.out_rate
            );
            self.timing.input_rate = cfg.out_rate as f64;
        }
        self.timing.output_rate = cfg.out_rate;
        let ratio = source_ratio(cfg.out_rate, self.timing.input_rate);
        self.timing.orig_src_ratio = ratio;
        self.timing.src_ratio = ratio;

        match Resampler::by_name(&cfg.resampler) {
            Ok(resampler) => path.resampler = Some(resampler),
            Err(e) => {
                tracing::error!("Failed to initialize resampler \"{}\": {}", cfg.resampler, e);
                path.active = false;
            }
        }

        path.rate_control = false;
        if self.system.audio_callback.is_none() && path.active && cfg.rate_control {
            if audio.supports(Capabilities::RATE_CONTROL) {
                path.driver_buffer_size = audio.with(|a| a.buffer_size());
                path.rate_control = true;
            } else {
                tracing::warn!("Audio rate control was desired, but driver does not support needed features.");
            }
        }

        self.timing.buffer_free.clear();

        // The threaded wrapper starts paused
        if path.active && !cfg.mute && self.system.audio_callback.is_some() {
            audio.with(|a| a.start());
        }

        tracing::debug!(
            "Audio driver \"{}\": {} Hz out, ratio {:.5}, float {}, rate control {}",
            audio.ident,
            cfg.out_rate,
            ratio,
            path.use_float,
            path.rate_control
        );

        self.audio = Some(audio);
        self.end_init(DriverCategory::Audio, true);
        Ok(())
    }

    /// Release the audio backend and log buffer statistics.
    pub fn uninit_audio(&mut self) {
        if let Some(audio) = self.audio.take() {
            audio.slot.release(|a| a.free());
            self.end_uninit(DriverCategory::Audio);
        }

        if self.config.audio.enable && self.audio_path.rate_control {
            if let Some(stats) = self.compute_audio_buffer_statistics() {
                tracing::info!(
                    "Average audio buffer saturation: {:.2} %, standard deviation (percentage points): {:.2} %.",
                    stats.saturation * 100.0,
                    stats.deviation * 100.0
                );
                tracing::info!(
                    "Amount of time spent close to underrun: {:.2} %. Close to blocking: {:.2} %.",
                    stats.near_underrun * 100.0,
                    stats.near_blocking * 100.0
                );
            }
        }

        self.audio_path.release();
        self.audio_path.active = false;
        self.audio_path.rate_control = false;
    }

    /// Play interleaved stereo samples produced by the core.
    ///
    /// Returns `false` if the backend failed to accept them; audio is then
    /// disabled until the next `init_audio`. Without active audio the
    /// samples are silently dropped.
    pub fn write_audio_samples(&mut self, samples: &[i16]) -> bool {
        if !self.is_audio_active() {
            return true;
        }
        let chunk = self.audio_path.chunk_size.max(2);
        samples.chunks(chunk).all(|chunk| self.flush_audio(chunk))
    }

    fn flush_audio(&mut self, samples: &[i16]) -> bool {
        let Some(audio) = self.audio.as_mut() else {
            return true;
        };
        let path = &mut self.audio_path;

        if path.rate_control {
            let avail = audio.with(|a| a.write_avail());
            self.timing.buffer_free.push(avail);
            self.timing.src_ratio = rate_controlled_ratio(
                self.timing.orig_src_ratio,
                self.config.audio.rate_control_delta,
                avail,
                path.driver_buffer_size,
            );
        }

        path.float_buf.clear();
        s16_to_float(samples, path.gain, &mut path.float_buf);

        let Some(resampler) = path.resampler.as_mut() else {
            return true;
        };
        path.resampled.clear();
        if let Err(e) = resampler.process(&path.float_buf, self.timing.src_ratio, &mut path.resampled) {
            tracing::warn!("Dropping audio: {}", e);
            return true;
        }

        let written = if path.use_float {
            audio.with(|a| a.write(Samples::F32(&path.resampled)))
        } else {
            path.s16_buf.clear();
            float_to_s16(&path.resampled, &mut path.s16_buf);
            audio.with(|a| a.write(Samples::S16(&path.s16_buf)))
        };

        match written {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Audio backend failed to write. Will continue without sound. ({})", e);
                path.active = false;
                false
            }
        }
    }
}
