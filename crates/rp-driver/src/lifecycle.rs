//! Driver lifecycle
//!
//! Brings every category up in a fixed order and tears it down again.
//! Video and input are opened together because a video backend may create
//! the input driver for its own window. Hardware-rendering cores are told
//! when their graphics context appears and disappears, unless the backend
//! kept the context alive across a reinit.

use crate::context::RuntimeContext;
use crate::registry::Registry;
use crate::slot::{ActiveDriver, LifecycleState};
use crate::stats::MEASURE_FRAME_TIME_SAMPLES_COUNT;
use rp_core::{BackendDescriptor, Capabilities, Descriptor, DriverCategory, DriverError, SystemAvInfo};
use rp_video::{AspectRatios, PixelPipeline, ShaderDir, ThreadedVideo, VideoInfo, VideoInit, WindowSize};
use std::path::Path;

/// Open the configured backend of an optional category. Failures are
/// reported by the caller and only disable the category.
fn open_soft<P, T: ?Sized>(
    registry: &Registry<BackendDescriptor<P, Box<T>>>,
    name: &str,
    params: &P,
) -> Option<ActiveDriver<T>> {
    let descriptor = registry.select(name).ok()?;
    let driver = descriptor.init(params)?;
    Some(ActiveDriver::owned(descriptor.ident(), descriptor.capabilities(), driver))
}

impl RuntimeContext {
    pub(crate) fn begin_init(&mut self, category: DriverCategory) {
        if self.lifecycle(category) != LifecycleState::Reinitializing {
            self.set_lifecycle(category, LifecycleState::Initializing);
        }
    }

    pub(crate) fn end_init(&mut self, category: DriverCategory, active: bool) {
        let state = if active {
            LifecycleState::Active
        } else {
            LifecycleState::Uninitialized
        };
        self.set_lifecycle(category, state);
    }

    pub(crate) fn end_uninit(&mut self, category: DriverCategory) {
        let state = if self.reinitializing && self.lifecycle(category) == LifecycleState::Active {
            LifecycleState::Reinitializing
        } else {
            LifecycleState::Uninitialized
        };
        self.set_lifecycle(category, state);
    }

    /// Bring up every driver.
    ///
    /// Fails only on errors the frontend cannot continue after (no backend
    /// registered, video or input could not be opened); see
    /// [`DriverError::is_fatal`].
    pub fn init_drivers(&mut self) -> Result<(), DriverError> {
        tracing::info!("Initializing drivers");

        self.adjust_system_rates();
        self.frame_count = 0;

        self.init_video_input()?;

        if !self.video_path.cache_context_ack {
            if let Some(hw) = self.system.hw_render.as_mut() {
                tracing::debug!("Resetting hardware render context");
                hw.reset();
            }
        }
        self.video_path.cache_context_ack = false;

        self.init_audio()?;

        if let Some(params) = self.camera_request.clone() {
            self.init_camera(params);
        }
        if self.location_requested {
            self.init_location();
        }
        self.init_osk();

        self.init_menu();
        if let Some(menu) = self.menu.as_mut() {
            menu.with(|m| m.context_reset());
        }

        // Keep a non-throttled state across reinits
        if self.nonblock_state {
            self.driver_set_nonblock_state(true);
        }

        self.video_path.frame_time_last = None;
        Ok(())
    }

    /// Tear down every driver. A persistent menu survives.
    pub fn uninit_drivers(&mut self) {
        self.uninit_audio();

        if self.video.is_some() && !self.config.video.cache_context {
            if let Some(hw) = self.system.hw_render.as_mut() {
                tracing::debug!("Destroying hardware render context");
                hw.destroy();
            }
        }

        if let Some(mut menu) = self.menu.take() {
            menu.with(|m| m.context_destroy());
            if self.config.menu.persist {
                self.menu = Some(menu);
            } else {
                menu.slot.release(|m| m.free());
                self.end_uninit(DriverCategory::Menu);
            }
        }

        self.uninit_video_input();
        self.uninit_camera();
        self.uninit_location();
        self.uninit_osk();
    }

    /// Tear everything down and bring it back up with the current settings.
    pub fn reinit_drivers(&mut self) -> Result<(), DriverError> {
        tracing::info!("Reinitializing drivers");
        self.reinitializing = true;
        self.uninit_drivers();
        let result = self.init_drivers();
        self.reinitializing = false;

        for category in DriverCategory::ALL {
            if self.lifecycle(category) == LifecycleState::Reinitializing {
                self.set_lifecycle(category, LifecycleState::Uninitialized);
            }
        }
        result
    }

    /// The core changed its geometry or timing.
    pub fn update_system_av_info(&mut self, info: SystemAvInfo) -> Result<(), DriverError> {
        self.system.av_info = info;
        self.reinit_drivers()
    }

    /// Final teardown, the menu included.
    pub fn shutdown(&mut self) {
        self.uninit_drivers();
        if let Some(menu) = self.menu.take() {
            menu.slot.release(|m| m.free());
            self.end_uninit(DriverCategory::Menu);
        }
    }

    /// Open the video backend and the input driver that goes with it,
    /// closing the ones already open first.
    pub fn init_video_input(&mut self) -> Result<(), DriverError> {
        if self.video.is_some() || self.input.is_some() {
            self.uninit_video_input();
        }

        self.begin_init(DriverCategory::Video);
        self.begin_init(DriverCategory::Input);

        let result = self.open_video_input();
        if result.is_err() {
            // Input failed after video came up
            if let Some(video) = self.video.take() {
                video.slot.release(|v| v.free());
            }
            self.video_path.threaded = false;
        }

        let (video, input) = (self.video.is_some(), self.input.is_some());
        self.end_init(DriverCategory::Video, result.is_ok() && video);
        self.end_init(DriverCategory::Input, result.is_ok() && input);
        result
    }

    fn open_video_input(&mut self) -> Result<(), DriverError> {
        let cfg = self.config.video.clone();
        let geometry = self.system.av_info.geometry;
        let hw_rendered = self.system.is_hw_rendered();

        let filter_path = (!cfg.filter_path.as_os_str().is_empty()).then_some(cfg.filter_path.as_path());
        self.video_path.pipeline =
            PixelPipeline::new(self.system.pixel_format, &geometry, filter_path, hw_rendered)?;
        self.init_shader_dir(&cfg.shader_dir);

        let ratios = AspectRatios::compute(&geometry, cfg.aspect_ratio_value, &cfg.custom_viewport);
        let aspect_ratio = ratios.value(cfg.aspect_ratio);
        self.video_path.aspect_ratios = ratios;
        self.video_path.aspect_ratio = aspect_ratio;

        let window = WindowSize::compute(&geometry, &cfg, aspect_ratio);
        self.video_path.window = window;
        if window.is_unspecified() {
            tracing::info!("Video @ fullscreen");
        } else {
            tracing::info!("Video @ {}x{}", window.width, window.height);
        }

        let info = VideoInfo {
            width: window.width,
            height: window.height,
            fullscreen: cfg.fullscreen,
            vsync: cfg.vsync && !self.timing.force_nonblock,
            force_aspect: cfg.force_aspect,
            smooth: cfg.smooth,
            input_scale: self.video_path.pipeline.scale(),
            rgb32: self.video_path.pipeline.output_rgb32(),
            cache_context: cfg.cache_context && hw_rendered,
        };

        let descriptor = self.registries.video.select(&cfg.driver)?.clone();
        let threaded = cfg.threaded && !hw_rendered;
        let init = if threaded {
            tracing::info!("Starting threaded video driver ...");
            ThreadedVideo::spawn(descriptor.clone(), info).map_err(|e| {
                tracing::error!("Cannot open threaded video driver: {}", e);
                DriverError::ThreadedInitFailed(DriverCategory::Video)
            })?
        } else {
            descriptor.init(&info).ok_or_else(|| {
                tracing::error!("Cannot open video driver \"{}\"", descriptor.ident());
                DriverError::InitFailed {
                    category: DriverCategory::Video,
                    ident: descriptor.ident().to_string(),
                }
            })?
        };
        self.video_path.threaded = threaded;
        self.video_path.cache_context_ack = init.context_cache_ack;

        let caps = descriptor.capabilities();
        let VideoInit { driver, input, .. } = init;
        let mut video = ActiveDriver::owned(descriptor.ident(), caps, driver);

        if caps.contains(Capabilities::POKE) {
            video.with(|v| {
                if let Some(poke) = v.poke() {
                    poke.set_aspect_ratio(aspect_ratio);
                }
            });
        }

        let custom = &mut self.config.video.custom_viewport;
        if caps.contains(Capabilities::VIEWPORT_INFO) && (custom.width == 0 || custom.height == 0) {
            custom.width = window.width;
            custom.height = window.height;
            if let Some(vp) = video.with(|v| v.viewport_info()) {
                custom.x = vp.x;
                custom.y = vp.y;
                custom.width = vp.width;
                custom.height = vp.height;
            }
        }

        if caps.contains(Capabilities::ROTATION) {
            let rotation = (cfg.rotation + self.system.rotation) % 4;
            video.with(|v| v.set_rotation(rotation));
        }

        self.video = Some(video);

        self.input = Some(match input {
            Some(shared) => {
                tracing::debug!("Video driver \"{}\" supplied its own input driver", descriptor.ident());
                // Optional input features are left to the driver's defaults
                let caps = Capabilities::RUMBLE | Capabilities::SENSORS;
                ActiveDriver::borrowed(descriptor.ident(), caps, shared)
            }
            None => {
                let input = self.registries.input.select(&self.config.input.driver)?;
                let driver = input.init(&()).ok_or_else(|| {
                    tracing::error!("Cannot init input driver \"{}\". Exiting ...", input.ident());
                    DriverError::InitFailed {
                        category: DriverCategory::Input,
                        ident: input.ident().to_string(),
                    }
                })?;
                ActiveDriver::owned(input.ident(), input.capabilities(), driver)
            }
        });

        self.timing.frame_times.clear();
        Ok(())
    }

    fn init_shader_dir(&mut self, dir: &Path) {
        self.video_path.shader_dir = None;
        if dir.as_os_str().is_empty() {
            return;
        }
        match ShaderDir::scan(dir) {
            Ok(found) => self.video_path.shader_dir = found,
            Err(e) => tracing::warn!("Failed to scan shader directory \"{}\": {}", dir.display(), e),
        }
    }

    /// Release the video backend and, unless video owns it, the input driver.
    pub fn uninit_video_input(&mut self) {
        if let Some(input) = self.input.take() {
            if !input.slot.release(|i| i.free()) {
                tracing::debug!("Input driver belongs to the video driver, not freeing it");
            }
            self.end_uninit(DriverCategory::Input);
        }

        let had_video = match self.video.take() {
            Some(video) => {
                video.slot.release(|v| v.free());
                self.end_uninit(DriverCategory::Video);
                true
            }
            None => false,
        };

        self.video_path.pipeline = PixelPipeline::raw(self.system.pixel_format);
        self.video_path.shader_dir = None;

        if had_video {
            self.log_monitor_fps();
        }
        self.video_path.threaded = false;
    }

    fn log_monitor_fps(&self) {
        if self.video_path.threaded {
            tracing::info!("Monitor FPS estimation is disabled for threaded video.");
            return;
        }
        let required = 2 * MEASURE_FRAME_TIME_SAMPLES_COUNT as u64;
        if self.timing.frame_times.total() < required {
            tracing::info!(
                "Does not have enough samples for monitor refresh rate estimation. Requires to run for at least {} frames.",
                required
            );
            return;
        }
        if let Some(fps) = self.driver_monitor_fps_statistics() {
            tracing::info!(
                "Average monitor Hz: {:.6} Hz. ({:.3} % frame time deviation, based on {} last samples).",
                fps.refresh_rate,
                100.0 * fps.deviation,
                fps.sample_points
            );
        }
    }

    fn init_camera(&mut self, mut params: rp_input::CameraParams) {
        if self.camera.is_some() || self.registries.camera.is_empty() {
            return;
        }
        if params.device.is_none() && !self.config.camera.device.is_empty() {
            params.device = Some(self.config.camera.device.clone());
        }

        self.begin_init(DriverCategory::Camera);
        self.camera = open_soft(&self.registries.camera, &self.config.camera.driver, &params);
        if self.camera.is_none() {
            tracing::error!("Failed to initialize camera driver. Will continue without camera.");
        }
        self.end_init(DriverCategory::Camera, self.camera.is_some());
    }

    fn uninit_camera(&mut self) {
        if let Some(camera) = self.camera.take() {
            camera.slot.release(|c| c.free());
            self.end_uninit(DriverCategory::Camera);
        }
    }

    fn init_location(&mut self) {
        if self.location.is_some() || self.registries.location.is_empty() {
            return;
        }

        self.begin_init(DriverCategory::Location);
        self.location = open_soft(&self.registries.location, &self.config.location.driver, &());
        if self.location.is_none() {
            tracing::error!("Failed to initialize location driver. Will continue without location.");
        }
        self.end_init(DriverCategory::Location, self.location.is_some());
    }

    fn uninit_location(&mut self) {
        if let Some(location) = self.location.take() {
            location.slot.release(|l| l.free());
            self.end_uninit(DriverCategory::Location);
        }
    }

    fn init_osk(&mut self) {
        if !self.config.osk.enable || self.osk.is_some() || self.registries.osk.is_empty() {
            return;
        }

        self.begin_init(DriverCategory::Osk);
        self.osk = open_soft(&self.registries.osk, &self.config.osk.driver, &());
        if self.osk.is_none() {
            tracing::error!("Failed to initialize OSK driver. Will continue without OSK.");
        }
        self.end_init(DriverCategory::Osk, self.osk.is_some());
    }

    fn uninit_osk(&mut self) {
        if let Some(osk) = self.osk.take() {
            osk.slot.release(|o| o.free());
            self.end_uninit(DriverCategory::Osk);
        }
    }

    fn init_menu(&mut self) {
        if !self.config.menu.enable || self.menu.is_some() || self.registries.menu.is_empty() {
            return;
        }

        self.begin_init(DriverCategory::Menu);
        self.menu = open_soft(&self.registries.menu, &self.config.menu.driver, &());
        if self.menu.is_none() {
            tracing::error!("Failed to initialize menu driver. Will continue without menu.");
        }
        self.end_init(DriverCategory::Menu, self.menu.is_some());
    }
}
