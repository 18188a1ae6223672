//! Information reported by the emulation core
//!
//! The core tells the frontend its output geometry, its timing, the pixel
//! format of its frames and, when it renders on the GPU itself, how to
//! notify it about graphics context resets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Output geometry of the core
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameGeometry {
    /// Nominal width of frames
    pub base_width: u32,
    /// Nominal height of frames
    pub base_height: u32,
    /// Largest width the core may ever output
    pub max_width: u32,
    /// Largest height the core may ever output
    pub max_height: u32,
    /// Display aspect ratio, `<= 0.0` means "derive from base size"
    pub aspect_ratio: f32,
}

impl Default for GameGeometry {
    fn default() -> Self {
        Self {
            base_width: 320,
            base_height: 240,
            max_width: 320,
            max_height: 240,
            aspect_ratio: 0.0,
        }
    }
}

/// Timing of the core
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemTiming {
    /// Frames per second the core runs at
    pub fps: f64,
    /// Audio sample rate the core produces
    pub sample_rate: f64,
}

impl SystemTiming {
    /// Whether the core has reported usable timing yet.
    pub fn is_valid(&self) -> bool {
        self.fps > 0.0 && self.sample_rate > 0.0
    }
}

/// Geometry plus timing, reported together by the core
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemAvInfo {
    pub geometry: GameGeometry,
    pub timing: SystemTiming,
}

/// Pixel format of frames produced by the core
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum PixelFormat {
    /// 15-bit color, deprecated, converted before display
    #[default]
    Rgb1555,
    /// 32-bit color with unused top byte
    Xrgb8888,
    /// 16-bit color
    Rgb565,
}

impl PixelFormat {
    /// Bytes used by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Xrgb8888 => 4,
            Self::Rgb1555 | Self::Rgb565 => 2,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb1555 => f.write_str("0RGB1555"),
            Self::Xrgb8888 => f.write_str("XRGB8888"),
            Self::Rgb565 => f.write_str("RGB565"),
        }
    }
}

/// Graphics API a hardware-rendering core draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwContextType {
    OpenGl,
    OpenGlCore,
    OpenGlEs2,
    Vulkan,
}

/// Context notification hook
pub type ContextCallback = Box<dyn FnMut() + Send>;

/// Hooks a hardware-rendering core registers with the frontend
pub struct HwRenderCallback {
    pub context_type: HwContextType,
    /// Called after a (new) graphics context is ready
    pub context_reset: Option<ContextCallback>,
    /// Called before the graphics context goes away
    pub context_destroy: Option<ContextCallback>,
}

impl HwRenderCallback {
    pub fn new(context_type: HwContextType) -> Self {
        Self {
            context_type,
            context_reset: None,
            context_destroy: None,
        }
    }

    pub fn with_reset<F: FnMut() + Send + 'static>(mut self, f: F) -> Self {
        self.context_reset = Some(Box::new(f));
        self
    }

    pub fn with_destroy<F: FnMut() + Send + 'static>(mut self, f: F) -> Self {
        self.context_destroy = Some(Box::new(f));
        self
    }

    pub(crate) fn fire(slot: &mut Option<ContextCallback>) {
        if let Some(cb) = slot.as_mut() {
            cb();
        }
    }

    /// Notify the core that its context is (again) usable.
    pub fn reset(&mut self) {
        Self::fire(&mut self.context_reset);
    }

    /// Notify the core that its context is about to be destroyed.
    pub fn destroy(&mut self) {
        Self::fire(&mut self.context_destroy);
    }
}

impl fmt::Debug for HwRenderCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HwRenderCallback")
            .field("context_type", &self.context_type)
            .field("context_reset", &self.context_reset.is_some())
            .field("context_destroy", &self.context_destroy.is_some())
            .finish()
    }
}

/// Audio pulled from the core on a worker thread; fills interleaved stereo
/// float samples.
pub type AudioCallback = Arc<dyn Fn(&mut Vec<f32>) + Send + Sync>;

/// Everything the core has told the frontend about itself
#[derive(Default)]
pub struct SystemInfo {
    pub av_info: SystemAvInfo,
    pub pixel_format: PixelFormat,
    pub hw_render: Option<HwRenderCallback>,
    /// Rotation requested by the core, in 90 degree steps
    pub rotation: u32,
    /// Core drives audio from its own callback instead of per-frame batches
    pub audio_callback: Option<AudioCallback>,
}

impl fmt::Debug for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemInfo")
            .field("av_info", &self.av_info)
            .field("pixel_format", &self.pixel_format)
            .field("hw_render", &self.hw_render)
            .field("rotation", &self.rotation)
            .field("audio_callback", &self.audio_callback.is_some())
            .finish()
    }
}

impl SystemInfo {
    pub fn is_hw_rendered(&self) -> bool {
        self.hw_render.is_some()
    }
}
