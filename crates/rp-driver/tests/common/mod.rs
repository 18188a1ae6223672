//! Counting mock backends shared by the integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use rp_audio::{AudioDescriptor, AudioDriver, Samples};
use rp_core::{AudioError, Capabilities, Config, DriverCategory, SystemAvInfo, SystemInfo, SystemTiming, VideoError};
use rp_driver::{Registries, Registry, RuntimeContext};
use rp_input::{share, InputDescriptor, InputDevice, InputDriver, RumbleEffect};
use rp_video::{VideoDescriptor, VideoDriver, VideoFrame, VideoInit, Viewport};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Call counters observed by the tests
#[derive(Debug, Default, Clone)]
pub struct Counters {
    pub video_init: Arc<AtomicUsize>,
    pub video_free: Arc<AtomicUsize>,
    pub video_frames: Arc<AtomicUsize>,
    pub video_nonblock: Arc<AtomicBool>,
    pub input_init: Arc<AtomicUsize>,
    pub input_free: Arc<AtomicUsize>,
    pub audio_init: Arc<AtomicUsize>,
    pub audio_free: Arc<AtomicUsize>,
    pub audio_written: Arc<AtomicUsize>,
    pub audio_nonblock: Arc<AtomicBool>,
    pub audio_float: Arc<AtomicBool>,
    /// Free space reported by the mock audio backend
    pub audio_avail: Arc<AtomicUsize>,
    pub rumbles: Arc<AtomicUsize>,
    pub shaders: Arc<Mutex<Vec<String>>>,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct MockVideo {
    counters: Counters,
}

impl VideoDriver for MockVideo {
    fn frame(&mut self, frame: Option<&VideoFrame<'_>>, _msg: Option<&str>) -> Result<(), VideoError> {
        if frame.is_some() {
            self.counters.video_frames.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.counters.video_nonblock.store(nonblock, Ordering::SeqCst);
    }

    fn alive(&mut self) -> bool {
        true
    }

    fn focus(&self) -> bool {
        true
    }

    fn free(&mut self) {
        self.counters.video_free.fetch_add(1, Ordering::SeqCst);
    }

    fn set_shader(&mut self, path: Option<&std::path::Path>) -> bool {
        if let Some(path) = path {
            self.counters.shaders.lock().push(path.display().to_string());
        }
        true
    }

    fn viewport_info(&self) -> Option<Viewport> {
        Some(Viewport {
            x: 0,
            y: 0,
            width: 960,
            height: 720,
            full_width: 960,
            full_height: 720,
        })
    }
}

pub struct MockInput {
    counters: Counters,
}

impl InputDriver for MockInput {
    fn poll(&mut self) {}

    fn state(&self, _port: u32, _device: InputDevice, _index: u32, _id: u32) -> i16 {
        0
    }

    fn key_pressed(&self, _key: u32) -> bool {
        false
    }

    fn free(&mut self) {
        self.counters.input_free.fetch_add(1, Ordering::SeqCst);
    }

    fn set_rumble(&mut self, _port: u32, _effect: RumbleEffect, _strength: u16) -> bool {
        self.counters.rumbles.fetch_add(1, Ordering::SeqCst);
        true
    }
}

pub struct MockAudio {
    counters: Counters,
}

/// Buffer size of the mock audio backend, in samples
pub const MOCK_AUDIO_BUFFER: usize = 4096;

impl AudioDriver for MockAudio {
    fn write(&mut self, samples: Samples<'_>) -> Result<usize, AudioError> {
        if matches!(samples, Samples::F32(_)) {
            self.counters.audio_float.store(true, Ordering::SeqCst);
        }
        self.counters.audio_written.fetch_add(samples.len(), Ordering::SeqCst);
        Ok(samples.len())
    }

    fn start(&mut self) -> bool {
        true
    }

    fn stop(&mut self) -> bool {
        true
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.counters.audio_nonblock.store(nonblock, Ordering::SeqCst);
    }

    fn free(&mut self) {
        self.counters.audio_free.fetch_add(1, Ordering::SeqCst);
    }

    fn use_float(&self) -> bool {
        true
    }

    fn write_avail(&self) -> usize {
        self.counters.audio_avail.load(Ordering::SeqCst)
    }

    fn buffer_size(&self) -> usize {
        MOCK_AUDIO_BUFFER
    }
}

/// Video backend; with `supply_input` it creates its own input driver
pub fn video_descriptor(ident: &'static str, counters: &Counters, supply_input: bool) -> VideoDescriptor {
    let counters = counters.clone();
    VideoDescriptor::new(
        ident,
        Capabilities::VIEWPORT_INFO | Capabilities::ROTATION,
        move |info| {
            counters.video_init.fetch_add(1, Ordering::SeqCst);
            counters.video_nonblock.store(!info.vsync, Ordering::SeqCst);
            let video = VideoInit::new(Box::new(MockVideo {
                counters: counters.clone(),
            }));
            if supply_input {
                let input = share(Box::new(MockInput {
                    counters: counters.clone(),
                }));
                Some(video.with_input(input))
            } else {
                Some(video)
            }
        },
    )
}

pub fn input_descriptor(counters: &Counters) -> InputDescriptor {
    let counters = counters.clone();
    InputDescriptor::new("mock", Capabilities::RUMBLE, move |_| {
        counters.input_init.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(MockInput {
            counters: counters.clone(),
        }) as Box<dyn InputDriver>)
    })
}

pub fn audio_descriptor(counters: &Counters, caps: Capabilities) -> AudioDescriptor {
    let counters = counters.clone();
    AudioDescriptor::new("mock", caps, move |_| {
        counters.audio_init.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(MockAudio {
            counters: counters.clone(),
        }) as Box<dyn AudioDriver>)
    })
}

/// Registries holding only the mocks (no camera/location/osk/menu)
pub fn mock_registries(counters: &Counters, supply_input: bool) -> Registries {
    let mut registries = Registries::empty();
    registries.video = Registry::new(DriverCategory::Video).with(video_descriptor("mock", counters, supply_input));
    registries.input = Registry::new(DriverCategory::Input).with(input_descriptor(counters));
    registries.audio = Registry::new(DriverCategory::Audio)
        .with(audio_descriptor(counters, Capabilities::FLOAT_AUDIO | Capabilities::RATE_CONTROL));
    registries
}

pub fn mock_config() -> Config {
    let mut config = Config::default();
    config.video.driver = "mock".to_string();
    config.input.driver = "mock".to_string();
    config.audio.driver = "mock".to_string();
    config.video.refresh_rate = 60.0;
    config
}

pub fn system(fps: f64, sample_rate: f64) -> SystemInfo {
    SystemInfo {
        av_info: SystemAvInfo {
            timing: SystemTiming { fps, sample_rate },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A context over the mocks, not yet initialized
pub fn mock_context(counters: &Counters) -> RuntimeContext {
    RuntimeContext::new(mock_config(), mock_registries(counters, false), system(60.0, 48000.0))
}
