//! Tests for the driver lifecycle

mod common;

use common::*;
use rp_core::{Capabilities, Config, DriverCategory, DriverError, HwContextType, HwRenderCallback, PixelFormat};
use rp_driver::{LifecycleState, Registries, Registry, RuntimeContext};
use rp_input::{CameraParams, RumbleEffect};
use rp_video::VideoFrame;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_init_and_uninit_drivers() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);

    ctx.init_drivers().unwrap();
    assert!(ctx.is_video_active());
    assert!(ctx.is_audio_active());
    assert!(!ctx.input_is_borrowed());
    assert_eq!(ctx.lifecycle(DriverCategory::Video), LifecycleState::Active);
    assert_eq!(ctx.lifecycle(DriverCategory::Audio), LifecycleState::Active);
    assert_eq!(ctx.active_ident(DriverCategory::Input), Some("mock"));

    ctx.uninit_drivers();
    assert_eq!(Counters::get(&counters.video_free), 1);
    assert_eq!(Counters::get(&counters.input_free), 1);
    assert_eq!(Counters::get(&counters.audio_free), 1);
    assert_eq!(ctx.lifecycle(DriverCategory::Video), LifecycleState::Uninitialized);
    assert!(!ctx.is_video_active());
}

#[test]
fn test_borrowed_input_is_not_freed() {
    let counters = Counters::default();
    let mut ctx = RuntimeContext::new(mock_config(), mock_registries(&counters, true), system(60.0, 48000.0));

    ctx.init_drivers().unwrap();
    assert!(ctx.input_is_borrowed());
    assert_eq!(Counters::get(&counters.input_init), 0);

    ctx.uninit_drivers();
    assert_eq!(Counters::get(&counters.input_free), 0);
    assert_eq!(Counters::get(&counters.video_free), 1);
}

#[test]
fn test_double_init_audio_keeps_handle() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);

    ctx.init_drivers().unwrap();
    ctx.init_audio().unwrap();
    ctx.init_audio().unwrap();
    assert_eq!(Counters::get(&counters.audio_init), 1);
    assert_eq!(Counters::get(&counters.audio_free), 0);
    assert!(ctx.is_audio_active());
}

#[test]
fn test_unknown_video_name_falls_back() {
    let counters = Counters::default();
    let mut config = mock_config();
    config.video.driver = "vulkan".to_string();
    let mut ctx = RuntimeContext::new(config, mock_registries(&counters, false), system(60.0, 48000.0));

    ctx.init_drivers().unwrap();
    assert_eq!(ctx.active_ident(DriverCategory::Video), Some("mock"));
}

#[test]
fn test_empty_video_registry_is_fatal() {
    let counters = Counters::default();
    let mut registries = mock_registries(&counters, false);
    registries.video = Registry::new(DriverCategory::Video);
    let mut ctx = RuntimeContext::new(mock_config(), registries, system(60.0, 48000.0));

    let err = ctx.init_drivers().unwrap_err();
    assert!(matches!(err, DriverError::NoDrivers(DriverCategory::Video)));
    assert_eq!(err.exit_code(), Some(rp_core::error::FATAL_EXIT_CODE));
}

#[test]
fn test_video_init_failure_is_fatal() {
    let counters = Counters::default();
    let mut registries = mock_registries(&counters, false);
    registries.video = Registry::new(DriverCategory::Video).with(rp_video::VideoDescriptor::new(
        "broken",
        Capabilities::empty(),
        |_| None,
    ));
    let mut config = mock_config();
    config.video.driver = "broken".to_string();
    let mut ctx = RuntimeContext::new(config, registries, system(60.0, 48000.0));

    let err = ctx.init_drivers().unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(ctx.lifecycle(DriverCategory::Video), LifecycleState::Uninitialized);
}

#[test]
fn test_audio_init_failure_is_soft() {
    let counters = Counters::default();
    let mut registries = mock_registries(&counters, false);
    registries.audio = Registry::new(DriverCategory::Audio).with(rp_audio::AudioDescriptor::new(
        "mock",
        Capabilities::empty(),
        |_| None,
    ));
    let mut ctx = RuntimeContext::new(mock_config(), registries, system(60.0, 48000.0));

    ctx.init_drivers().unwrap();
    assert!(ctx.is_video_active());
    assert!(!ctx.is_audio_active());
    assert!(ctx.write_audio_samples(&[0; 64]));
}

#[test]
fn test_unknown_resampler_disables_audio() {
    let counters = Counters::default();
    let mut config = mock_config();
    config.audio.resampler = "fancy".to_string();
    let mut ctx = RuntimeContext::new(config, mock_registries(&counters, false), system(60.0, 48000.0));

    ctx.init_drivers().unwrap();
    assert!(!ctx.is_audio_active());
    assert!(ctx.write_audio_samples(&[0; 64]));
    assert_eq!(Counters::get(&counters.audio_written), 0);
}

#[test]
fn test_hw_context_reset_and_destroy() {
    let counters = Counters::default();
    let resets = Arc::new(AtomicUsize::new(0));
    let destroys = Arc::new(AtomicUsize::new(0));
    let mut sys = system(60.0, 48000.0);
    let (r, d) = (Arc::clone(&resets), Arc::clone(&destroys));
    sys.hw_render = Some(
        HwRenderCallback::new(HwContextType::OpenGl)
            .with_reset(move || {
                r.fetch_add(1, Ordering::SeqCst);
            })
            .with_destroy(move || {
                d.fetch_add(1, Ordering::SeqCst);
            }),
    );
    let mut ctx = RuntimeContext::new(mock_config(), mock_registries(&counters, false), sys);

    ctx.init_drivers().unwrap();
    assert_eq!(resets.load(Ordering::SeqCst), 1);

    ctx.reinit_drivers().unwrap();
    assert_eq!(resets.load(Ordering::SeqCst), 2);
    assert_eq!(destroys.load(Ordering::SeqCst), 1);

    ctx.shutdown();
    assert_eq!(destroys.load(Ordering::SeqCst), 2);

    // Nothing left to destroy
    ctx.shutdown();
    assert_eq!(destroys.load(Ordering::SeqCst), 2);
}

#[test]
fn test_cached_context_is_not_reset() {
    let resets = Arc::new(AtomicUsize::new(0));
    let destroys = Arc::new(AtomicUsize::new(0));
    let mut sys = system(60.0, 48000.0);
    let (r, d) = (Arc::clone(&resets), Arc::clone(&destroys));
    sys.hw_render = Some(
        HwRenderCallback::new(HwContextType::OpenGlCore)
            .with_reset(move || {
                r.fetch_add(1, Ordering::SeqCst);
            })
            .with_destroy(move || {
                d.fetch_add(1, Ordering::SeqCst);
            }),
    );
    let mut config = Config::default();
    config.video.cache_context = true;
    // The null video backend acknowledges a cached context
    let mut ctx = RuntimeContext::new(config, Registries::builtin(), sys);

    ctx.init_drivers().unwrap();
    assert_eq!(resets.load(Ordering::SeqCst), 1);

    ctx.reinit_drivers().unwrap();
    assert_eq!(resets.load(Ordering::SeqCst), 1);
    assert_eq!(destroys.load(Ordering::SeqCst), 0);
}

#[test]
fn test_menu_persists_across_reinit() {
    let mut ctx = RuntimeContext::new(Config::default(), Registries::builtin(), system(60.0, 48000.0));

    ctx.init_drivers().unwrap();
    assert_eq!(ctx.lifecycle(DriverCategory::Menu), LifecycleState::Active);

    ctx.reinit_drivers().unwrap();
    assert_eq!(ctx.lifecycle(DriverCategory::Menu), LifecycleState::Active);
    assert_eq!(ctx.lifecycle(DriverCategory::Video), LifecycleState::Active);
    assert!(ctx.menu_iterate());

    ctx.uninit_drivers();
    assert_eq!(ctx.lifecycle(DriverCategory::Menu), LifecycleState::Active);

    ctx.shutdown();
    assert_eq!(ctx.lifecycle(DriverCategory::Menu), LifecycleState::Uninitialized);
}

#[test]
fn test_menu_freed_without_persistence() {
    let mut config = Config::default();
    config.menu.persist = false;
    let mut ctx = RuntimeContext::new(config, Registries::builtin(), system(60.0, 48000.0));

    ctx.init_drivers().unwrap();
    ctx.uninit_drivers();
    assert_eq!(ctx.lifecycle(DriverCategory::Menu), LifecycleState::Uninitialized);
    assert!(!ctx.menu_iterate());
}

#[test]
fn test_camera_only_when_requested() {
    let mut config = Config::default();
    config.camera.allow = true;
    let mut ctx = RuntimeContext::new(config, Registries::builtin(), system(60.0, 48000.0));

    ctx.init_drivers().unwrap();
    assert_eq!(ctx.lifecycle(DriverCategory::Camera), LifecycleState::Uninitialized);

    assert!(ctx.request_camera(CameraParams::default()));
    ctx.reinit_drivers().unwrap();
    assert_eq!(ctx.lifecycle(DriverCategory::Camera), LifecycleState::Active);
    assert!(ctx.camera_start());

    let mut frames = 0;
    ctx.camera_poll(&mut |frame| {
        assert_eq!(frame.width, 640);
        frames += 1;
    });
    assert_eq!(frames, 1);
}

#[test]
fn test_camera_request_refused() {
    let mut ctx = RuntimeContext::new(Config::default(), Registries::builtin(), system(60.0, 48000.0));
    assert!(!ctx.request_camera(CameraParams::default()));
    assert!(!ctx.request_location());
}

#[test]
fn test_update_system_av_info_reinits() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);
    ctx.init_drivers().unwrap();

    let mut info = ctx.system().av_info;
    info.geometry.base_width = 256;
    info.geometry.base_height = 224;
    info.timing.fps = 59.94;
    ctx.update_system_av_info(info).unwrap();

    assert_eq!(Counters::get(&counters.video_init), 2);
    assert_eq!(Counters::get(&counters.video_free), 1);
    assert_eq!(ctx.system().av_info.geometry.base_width, 256);
    assert_eq!(ctx.lifecycle(DriverCategory::Audio), LifecycleState::Active);
}

#[test]
fn test_custom_viewport_seeded_from_backend() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);
    assert_eq!(ctx.config().video.custom_viewport.width, 0);

    ctx.init_drivers().unwrap();
    let vp = ctx.config().video.custom_viewport;
    assert_eq!((vp.width, vp.height), (960, 720));
}

#[test]
fn test_video_frame_through_converter() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);
    ctx.init_drivers().unwrap();
    assert_eq!(ctx.system().pixel_format, PixelFormat::Rgb1555);

    let data = vec![0u8; 4 * 4 * 2];
    let frame = VideoFrame::new(&data, 4, 4, 8, PixelFormat::Rgb1555);
    ctx.video_frame(Some(&frame)).unwrap();
    ctx.video_frame(None).unwrap();

    assert_eq!(Counters::get(&counters.video_frames), 1);
    assert_eq!(ctx.frame_count(), 2);
    assert_eq!(ctx.timing().frame_times.len(), 1);
}

#[test]
fn test_video_frame_without_video() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);
    assert!(matches!(
        ctx.video_frame(None),
        Err(DriverError::NotActive(DriverCategory::Video))
    ));
}

#[test]
fn test_rumble_passthrough() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);
    assert!(!ctx.driver_set_rumble_state(0, RumbleEffect::Strong, 0xffff));

    ctx.init_drivers().unwrap();
    assert!(ctx.driver_set_rumble_state(0, RumbleEffect::Weak, 0x8000));
    assert_eq!(Counters::get(&counters.rumbles), 1);
    // The mock input does not advertise sensors
    assert_eq!(ctx.driver_sensor_get_input(0, 0), 0.0);
    // No FBO support
    assert_eq!(ctx.driver_get_current_framebuffer(), 0);
    assert_eq!(ctx.driver_get_proc_address("glClear"), None);
}

#[test]
fn test_init_video_input_replaces_open_drivers() {
    let counters = Counters::default();
    let mut ctx = mock_context(&counters);
    ctx.init_drivers().unwrap();

    ctx.init_video_input().unwrap();
    assert_eq!(Counters::get(&counters.video_init), 2);
    assert_eq!(Counters::get(&counters.video_free), 1);
    assert_eq!(Counters::get(&counters.input_init), 2);
    assert_eq!(Counters::get(&counters.input_free), 1);
    assert_eq!(ctx.lifecycle(DriverCategory::Video), LifecycleState::Active);
    assert_eq!(ctx.lifecycle(DriverCategory::Input), LifecycleState::Active);

    ctx.uninit_drivers();
    assert_eq!(Counters::get(&counters.video_free), 2);
    assert_eq!(Counters::get(&counters.input_free), 2);
}

#[test]
fn test_init_video_input_keeps_borrowed_input() {
    let counters = Counters::default();
    let mut ctx = RuntimeContext::new(mock_config(), mock_registries(&counters, true), system(60.0, 48000.0));
    ctx.init_drivers().unwrap();

    ctx.init_video_input().unwrap();
    assert!(ctx.input_is_borrowed());
    assert_eq!(Counters::get(&counters.video_free), 1);
    assert_eq!(Counters::get(&counters.input_free), 0);
}

#[test]
fn test_input_failure_releases_video() {
    let counters = Counters::default();
    let mut registries = mock_registries(&counters, false);
    registries.input = Registry::new(DriverCategory::Input).with(rp_input::InputDescriptor::new(
        "mock",
        Capabilities::empty(),
        |_| None,
    ));
    let mut ctx = RuntimeContext::new(mock_config(), registries, system(60.0, 48000.0));

    let err = ctx.init_drivers().unwrap_err();
    assert!(matches!(
        err,
        DriverError::InitFailed {
            category: DriverCategory::Input,
            ..
        }
    ));
    assert!(err.is_fatal());
    assert!(!ctx.is_video_active());
    assert_eq!(Counters::get(&counters.video_init), 1);
    assert_eq!(Counters::get(&counters.video_free), 1);
    assert_eq!(ctx.lifecycle(DriverCategory::Video), LifecycleState::Uninitialized);
    assert_eq!(ctx.lifecycle(DriverCategory::Input), LifecycleState::Uninitialized);

    // Nothing left to free on teardown
    ctx.shutdown();
    assert_eq!(Counters::get(&counters.video_free), 1);
}
