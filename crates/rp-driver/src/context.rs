//! Runtime context
//!
//! Everything the driver layer knows at runtime lives in one
//! [`RuntimeContext`]: the configuration, the registries, what the core
//! reported about itself, the active backend of every category and the
//! timing state derived from all of that. A single control thread drives
//! it through `&mut self`.

use crate::audio_path::AudioPath;
use crate::builtin::Registries;
use crate::menu::MenuDriver;
use crate::nonblock::NonblockPlan;
use crate::rates::{compute_input_rate, source_ratio};
use crate::slot::{ActiveDriver, LifecycleState};
use crate::stats::{
    AudioBufferStats, MonitorFps, SampleRing, AUDIO_BUFFER_FREE_SAMPLES_COUNT, MEASURE_FRAME_TIME_SAMPLES_COUNT,
};
use crate::video_path::VideoPath;
use rp_audio::AudioDriver;
use rp_core::{Config, DriverCategory, SystemInfo};
use rp_input::{CameraDriver, CameraParams, InputDriver, LocationDriver, OskDriver};
use rp_video::VideoDriver;
use std::collections::HashMap;

/// Audio/video timing derived from the core and the display
#[derive(Debug, Clone)]
pub struct TimingState {
    /// Sample rate the audio backend runs at
    pub output_rate: u32,
    /// Rate the core's audio is treated as having
    pub input_rate: f64,
    /// Resampling ratio before rate control
    pub orig_src_ratio: f64,
    /// Resampling ratio currently applied
    pub src_ratio: f64,
    pub vsync: bool,
    /// Vsync cannot keep up with the core, video never blocks
    pub force_nonblock: bool,
    /// Frame times in microseconds
    pub frame_times: SampleRing<u64>,
    /// Free samples reported by the audio backend before each write
    pub buffer_free: SampleRing<usize>,
}

impl TimingState {
    fn new(config: &Config) -> Self {
        Self {
            output_rate: config.audio.out_rate,
            input_rate: 0.0,
            orig_src_ratio: 1.0,
            src_ratio: 1.0,
            vsync: config.video.vsync,
            force_nonblock: false,
            frame_times: SampleRing::new(MEASURE_FRAME_TIME_SAMPLES_COUNT),
            buffer_free: SampleRing::new(AUDIO_BUFFER_FREE_SAMPLES_COUNT),
        }
    }
}

/// The driver layer's complete runtime state
pub struct RuntimeContext {
    pub(crate) config: Config,
    pub(crate) registries: Registries,
    pub(crate) system: SystemInfo,

    pub(crate) video: Option<ActiveDriver<dyn VideoDriver>>,
    pub(crate) input: Option<ActiveDriver<dyn InputDriver>>,
    pub(crate) audio: Option<ActiveDriver<dyn AudioDriver>>,
    pub(crate) camera: Option<ActiveDriver<dyn CameraDriver>>,
    pub(crate) location: Option<ActiveDriver<dyn LocationDriver>>,
    pub(crate) osk: Option<ActiveDriver<dyn OskDriver>>,
    pub(crate) menu: Option<ActiveDriver<dyn MenuDriver>>,

    pub(crate) timing: TimingState,
    pub(crate) audio_path: AudioPath,
    pub(crate) video_path: VideoPath,

    /// Logical "run unthrottled" flag
    pub(crate) nonblock_state: bool,
    pub(crate) frame_count: u64,
    pub(crate) states: HashMap<DriverCategory, LifecycleState>,
    /// Inside `reinit_drivers`
    pub(crate) reinitializing: bool,

    /// Camera requested by the core
    pub(crate) camera_request: Option<CameraParams>,
    /// Location requested by the core
    pub(crate) location_requested: bool,
}

impl RuntimeContext {
    /// Create a context with nothing initialized yet
    pub fn new(config: Config, registries: Registries, system: SystemInfo) -> Self {
        let timing = TimingState::new(&config);
        let video_path = VideoPath::new(&config, &system);
        Self {
            config,
            registries,
            system,
            video: None,
            input: None,
            audio: None,
            camera: None,
            location: None,
            osk: None,
            menu: None,
            timing,
            audio_path: AudioPath::default(),
            video_path,
            nonblock_state: false,
            frame_count: 0,
            states: HashMap::new(),
            reinitializing: false,
            camera_request: None,
            location_requested: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settings changed here take effect on the next (re)init
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn system(&self) -> &SystemInfo {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut SystemInfo {
        &mut self.system
    }

    pub fn timing(&self) -> &TimingState {
        &self.timing
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn nonblock_state(&self) -> bool {
        self.nonblock_state
    }

    /// Where `category` is in its lifecycle
    pub fn lifecycle(&self, category: DriverCategory) -> LifecycleState {
        self.states.get(&category).copied().unwrap_or_default()
    }

    pub(crate) fn set_lifecycle(&mut self, category: DriverCategory, state: LifecycleState) {
        tracing::trace!("{} driver: {:?}", category, state);
        self.states.insert(category, state);
    }

    /// Identifier of the active backend of `category`
    pub fn active_ident(&self, category: DriverCategory) -> Option<&str> {
        let ident = match category {
            DriverCategory::Video => self.video.as_ref().map(|d| &d.ident),
            DriverCategory::Input => self.input.as_ref().map(|d| &d.ident),
            DriverCategory::Audio => self.audio.as_ref().map(|d| &d.ident),
            DriverCategory::Camera => self.camera.as_ref().map(|d| &d.ident),
            DriverCategory::Location => self.location.as_ref().map(|d| &d.ident),
            DriverCategory::Osk => self.osk.as_ref().map(|d| &d.ident),
            DriverCategory::Menu => self.menu.as_ref().map(|d| &d.ident),
        };
        ident.map(String::as_str)
    }

    pub fn is_video_active(&self) -> bool {
        self.video.is_some()
    }

    /// Audio backend present and usable
    pub fn is_audio_active(&self) -> bool {
        self.audio.is_some() && self.audio_path.active
    }

    /// The input driver was supplied by the video backend
    pub fn input_is_borrowed(&self) -> bool {
        self.input.as_ref().is_some_and(|d| !d.slot.is_owned())
    }

    /// Ask for a camera, honored if cameras are allowed. Takes effect on
    /// the next `init_drivers`.
    pub fn request_camera(&mut self, params: CameraParams) -> bool {
        if !self.config.camera.allow {
            tracing::warn!("Core requested a camera, but camera access is disabled");
            return false;
        }
        self.camera_request = Some(params);
        true
    }

    /// Ask for location updates, honored if location access is allowed.
    /// Takes effect on the next `init_drivers`.
    pub fn request_location(&mut self) -> bool {
        if !self.config.location.allow {
            tracing::warn!("Core requested location, but location access is disabled");
            return false;
        }
        self.location_requested = true;
        true
    }

    /// Recompute the audio input rate and the vsync policy from the core's
    /// timing and the configured refresh rate.
    pub fn adjust_system_rates(&mut self) {
        self.timing.force_nonblock = false;
        self.timing.vsync = self.config.video.vsync;

        let refresh = self.config.video.refresh_rate as f64;
        let Some(decision) = compute_input_rate(&self.system.av_info.timing, refresh) else {
            return;
        };
        self.timing.input_rate = decision.input_rate;
        self.timing.force_nonblock = decision.force_nonblock;

        if self.video.is_some() {
            if self.timing.force_nonblock {
                if let Some(video) = self.video.as_mut() {
                    video.with(|v| v.set_nonblock_state(true));
                }
            } else {
                self.driver_set_nonblock_state(self.nonblock_state);
            }
        }
    }

    /// Apply the logical non-block flag to every active backend.
    pub fn driver_set_nonblock_state(&mut self, nonblock: bool) {
        self.nonblock_state = nonblock;
        let plan = NonblockPlan::new(
            nonblock,
            self.timing.vsync,
            self.timing.force_nonblock,
            self.config.audio.sync,
        );

        if let Some(video) = self.video.as_mut() {
            video.with(|v| v.set_nonblock_state(plan.video));
        }
        if self.audio_path.active {
            if let Some(audio) = self.audio.as_mut() {
                audio.with(|a| a.set_nonblock_state(plan.audio));
            }
        }
        self.audio_path.chunk_size = plan.chunk_size;
    }

    /// Commit a new display refresh rate, e.g. one estimated by
    /// [`Self::driver_monitor_fps_statistics`].
    pub fn driver_set_monitor_refresh_rate(&mut self, hz: f32) {
        let msg = format!("Setting refresh rate to: {:.3} Hz.", hz);
        self.video_path.messages.push(msg.as_str(), 1, 180);
        tracing::info!("{}", msg);

        self.config.video.refresh_rate = hz;
        self.adjust_system_rates();
        if self.timing.input_rate <= 0.0 {
            return;
        }

        let ratio = source_ratio(self.config.audio.out_rate, self.timing.input_rate);
        self.timing.orig_src_ratio = ratio;
        self.timing.src_ratio = ratio;
    }

    /// Display refresh rate estimated from measured frame times.
    ///
    /// Not available with threaded video, where frame times say nothing
    /// about the display.
    pub fn driver_monitor_fps_statistics(&self) -> Option<MonitorFps> {
        if self.video_path.threaded {
            return None;
        }
        MonitorFps::from_frame_times(&self.timing.frame_times)
    }

    /// Audio buffer occupancy measured while rate control was running
    pub fn compute_audio_buffer_statistics(&self) -> Option<AudioBufferStats> {
        AudioBufferStats::from_free_samples(&self.timing.buffer_free, self.audio_path.driver_buffer_size)
    }
}

impl Drop for RuntimeContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("video", &self.active_ident(DriverCategory::Video))
            .field("input", &self.active_ident(DriverCategory::Input))
            .field("audio", &self.active_ident(DriverCategory::Audio))
            .field("nonblock_state", &self.nonblock_state)
            .field("frame_count", &self.frame_count)
            .field("timing", &self.timing)
            .finish()
    }
}
