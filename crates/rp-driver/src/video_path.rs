//! Video path
//!
//! Frames from the core go through the pixel pipeline to the backend,
//! together with the on-screen message of the moment. The time between
//! frames is recorded for monitor refresh estimation.

use crate::context::RuntimeContext;
use rp_core::{Config, DriverCategory, DriverError, SystemInfo};
use rp_video::{AspectRatios, MessageQueue, PixelPipeline, ShaderDir, VideoFrame, WindowSize};
use std::path::PathBuf;
use std::time::Instant;

/// Frames a shader change notice stays on screen
const SHADER_MESSAGE_FRAMES: u32 = 180;

/// Video-side state rebuilt on every video init
#[derive(Debug)]
pub struct VideoPath {
    pub(crate) pipeline: PixelPipeline,
    pub(crate) shader_dir: Option<ShaderDir>,
    pub(crate) aspect_ratios: AspectRatios,
    /// Ratio of the configured aspect mode
    pub(crate) aspect_ratio: f32,
    pub(crate) window: WindowSize,
    /// Backend runs behind `ThreadedVideo`
    pub(crate) threaded: bool,
    /// Backend kept the hardware context across the last reinit
    pub(crate) cache_context_ack: bool,
    pub(crate) frame_time_last: Option<Instant>,
    pub(crate) messages: MessageQueue,
}

impl VideoPath {
    pub(crate) fn new(config: &Config, system: &SystemInfo) -> Self {
        let geometry = &system.av_info.geometry;
        let aspect_ratios =
            AspectRatios::compute(geometry, config.video.aspect_ratio_value, &config.video.custom_viewport);
        Self {
            pipeline: PixelPipeline::raw(system.pixel_format),
            shader_dir: None,
            aspect_ratio: aspect_ratios.value(config.video.aspect_ratio),
            aspect_ratios,
            window: WindowSize::default(),
            threaded: false,
            cache_context_ack: false,
            frame_time_last: None,
            messages: MessageQueue::default(),
        }
    }

    pub fn pipeline(&self) -> &PixelPipeline {
        &self.pipeline
    }

    pub fn shader_dir(&self) -> Option<&ShaderDir> {
        self.shader_dir.as_ref()
    }

    pub fn aspect_ratios(&self) -> &AspectRatios {
        &self.aspect_ratios
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn window(&self) -> WindowSize {
        self.window
    }

    pub fn is_threaded(&self) -> bool {
        self.threaded
    }
}

impl RuntimeContext {
    pub fn video_path(&self) -> &VideoPath {
        &self.video_path
    }

    /// Queue an on-screen message shown for `duration` frames.
    pub fn push_message(&mut self, text: impl Into<String>, priority: u32, duration: u32) -> bool {
        self.video_path.messages.push(text, priority, duration)
    }

    /// Present one frame; `None` repeats the previous one.
    ///
    /// A backend error (a lost device that could not be restored) is
    /// returned as [`DriverError::FrameFailed`]; the caller simply keeps
    /// presenting, the backend retries on every frame.
    pub fn video_frame(&mut self, frame: Option<&VideoFrame<'_>>) -> Result<(), DriverError> {
        let Some(video) = self.video.as_mut() else {
            return Err(DriverError::NotActive(DriverCategory::Video));
        };

        let now = Instant::now();
        if let Some(last) = self.video_path.frame_time_last {
            let usec = now.duration_since(last).as_micros();
            self.timing.frame_times.push(u64::try_from(usec).unwrap_or(u64::MAX));
        }
        self.video_path.frame_time_last = Some(now);

        let msg = self.video_path.messages.pull();
        let result = match frame {
            Some(frame) => {
                let processed = self.video_path.pipeline.process(frame)?;
                video.with(|v| v.frame(Some(&processed), msg.as_deref()))
            }
            None => video.with(|v| v.frame(None, msg.as_deref())),
        };
        self.frame_count += 1;

        result.map_err(|e| {
            tracing::warn!("Video frame failed: {}", e);
            DriverError::FrameFailed(e)
        })
    }

    /// Poll the active input driver, once per frame.
    pub fn input_poll(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.with(|i| i.poll());
        }
    }

    /// Whether the video backend's window is still open
    pub fn video_alive(&mut self) -> bool {
        self.video.as_mut().is_some_and(|video| video.with(|v| v.alive()))
    }

    /// Switch to the next (or previous) shader of the shader directory.
    ///
    /// Returns the shader now applied.
    pub fn cycle_shader(&mut self, forward: bool) -> Option<PathBuf> {
        let dir = self.video_path.shader_dir.as_mut()?;
        let path = if forward { dir.next() } else { dir.prev() }?.to_path_buf();
        let video = self.video.as_mut()?;

        if !video.with(|v| v.set_shader(Some(&path))) {
            tracing::error!("Failed to apply shader \"{}\"", path.display());
            return None;
        }

        let msg = format!("Shader: \"{}\"", path.display());
        tracing::info!("{}", msg);
        self.video_path.messages.push(msg, 1, SHADER_MESSAGE_FRAMES);
        Some(path)
    }
}
