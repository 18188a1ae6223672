//! Video driver interface
//!
//! A video backend presents frames produced by the core. Beyond the
//! required operations it may expose a poke interface (aspect ratio, OSD,
//! texture overlay, framebuffer queries) and a windowing context driver.
//! Both are optional; their presence is also advertised through the
//! descriptor's capabilities.

use rp_core::{BackendDescriptor, PixelFormat, VideoError};
use rp_input::SharedInput;
use std::path::Path;

/// Parameters passed to a video driver constructor
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Window width, `0` together with `height == 0` means "pick for me"
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    pub force_aspect: bool,
    /// Bilinear filtering when scaling
    pub smooth: bool,
    /// Largest input is `SCALE_BASE * input_scale` in either dimension
    pub input_scale: u32,
    /// Frames arrive as XRGB8888 rather than RGB565
    pub rgb32: bool,
    /// Frontend asks the backend to keep its hardware context across reinits
    pub cache_context: bool,
}

impl Default for VideoInfo {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fullscreen: false,
            vsync: true,
            force_aspect: true,
            smooth: false,
            input_scale: 1,
            rgb32: false,
            cache_context: false,
        }
    }
}

/// A frame handed to the backend
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Bytes per row
    pub pitch: usize,
    pub format: PixelFormat,
}

impl<'a> VideoFrame<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, pitch: usize, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            pitch,
            format,
        }
    }

    /// Check that the frame's buffer covers its declared size.
    pub fn validate(&self) -> Result<(), VideoError> {
        let row_bytes = self.width as usize * self.format.bytes_per_pixel();
        if self.pitch < row_bytes {
            return Err(VideoError::InvalidFrame(format!(
                "pitch {} smaller than row of {} bytes",
                self.pitch, row_bytes
            )));
        }
        if self.height > 0 {
            let needed = self.pitch * (self.height as usize - 1) + row_bytes;
            if self.data.len() < needed {
                return Err(VideoError::InvalidFrame(format!(
                    "{} bytes for a {}x{} frame",
                    self.data.len(),
                    self.width,
                    self.height
                )));
            }
        }
        Ok(())
    }

    /// Pixel bytes of row `y`, without padding
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.pitch;
        &self.data[start..start + self.width as usize * self.format.bytes_per_pixel()]
    }
}

/// Rectangle the backend renders into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub full_width: u32,
    pub full_height: u32,
}

/// What happened to the window since the last check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowEvent {
    pub quit: bool,
    pub resize: Option<(u32, u32)>,
}

/// Optional backend controls
pub trait VideoPoke {
    fn set_aspect_ratio(&mut self, _ratio: f32) {}

    fn set_osd_msg(&mut self, _msg: &str) {}

    fn show_mouse(&mut self, _visible: bool) {}

    /// Upload a texture drawn over the frame (menu background and similar)
    fn set_texture_frame(&mut self, _frame: &VideoFrame<'_>, _alpha: f32) {}

    fn set_texture_enable(&mut self, _enable: bool, _full_screen: bool) {}

    /// Framebuffer a hardware-rendering core should draw into
    fn current_framebuffer(&self) -> usize {
        0
    }

    /// Address of a graphics API entry point
    fn proc_address(&self, _symbol: &str) -> Option<usize> {
        None
    }
}

/// Windowing context owned by a backend
pub trait ContextDriver {
    fn swap_buffers(&mut self);

    fn check_window(&mut self, frame_count: u64) -> WindowEvent;

    fn set_swap_interval(&mut self, _interval: u32) {}

    fn set_resize(&mut self, _width: u32, _height: u32) {}

    fn has_focus(&self) -> bool {
        true
    }

    fn proc_address(&self, _symbol: &str) -> Option<usize> {
        None
    }
}

/// Video backend
pub trait VideoDriver: Send {
    /// Present a frame. `None` repeats the previous frame. `msg` is an
    /// on-screen message to draw on top.
    ///
    /// A backend that lost its device tries to restore it here and returns
    /// an error if that fails; the caller retries on the next frame.
    fn frame(&mut self, frame: Option<&VideoFrame<'_>>, msg: Option<&str>) -> Result<(), VideoError>;

    /// Disable or enable vsync waiting
    fn set_nonblock_state(&mut self, nonblock: bool);

    /// Whether the window is still open
    fn alive(&mut self) -> bool;

    /// Whether the window has input focus
    fn focus(&self) -> bool;

    /// Release backend resources
    fn free(&mut self);

    /// Load a shader preset, `None` restores the stock shader
    fn set_shader(&mut self, _path: Option<&Path>) -> bool {
        false
    }

    /// Rotate output by `rotation` * 90 degrees (`ROTATION`)
    fn set_rotation(&mut self, _rotation: u32) {}

    /// Current viewport (`VIEWPORT_INFO`)
    fn viewport_info(&self) -> Option<Viewport> {
        None
    }

    /// Poke interface (`POKE`)
    fn poke(&mut self) -> Option<&mut dyn VideoPoke> {
        None
    }

    /// Context driver (`CONTEXT`)
    fn context(&mut self) -> Option<&mut dyn ContextDriver> {
        None
    }
}

/// A freshly constructed video backend
pub struct VideoInit {
    pub driver: Box<dyn VideoDriver>,
    /// Input driver the backend created alongside its window
    pub input: Option<SharedInput>,
    /// The backend honored `VideoInfo::cache_context`
    pub context_cache_ack: bool,
}

impl VideoInit {
    pub fn new(driver: Box<dyn VideoDriver>) -> Self {
        Self {
            driver,
            input: None,
            context_cache_ack: false,
        }
    }

    pub fn with_input(mut self, input: SharedInput) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_context_cache_ack(mut self, ack: bool) -> Self {
        self.context_cache_ack = ack;
        self
    }
}

/// A registered video backend
pub type VideoDescriptor = BackendDescriptor<VideoInfo, VideoInit>;
