//! Camera driver interface
//!
//! Cores that want camera frames ask for them while loading. The frontend
//! then opens the configured camera backend and forwards every captured
//! frame to the core.

use rp_core::BackendDescriptor;

/// Default capture width when the core does not request one
pub const DEFAULT_CAMERA_WIDTH: u32 = 640;
/// Default capture height when the core does not request one
pub const DEFAULT_CAMERA_HEIGHT: u32 = 480;

/// Parameters passed to a camera constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraParams {
    /// Requested device, `None` for the backend default
    pub device: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            device: None,
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
        }
    }
}

/// One captured frame, XRGB8888
#[derive(Debug, Clone, Copy)]
pub struct CameraFrame<'a> {
    pub pixels: &'a [u32],
    pub width: u32,
    pub height: u32,
    /// Pixels per row
    pub pitch: usize,
}

/// Camera backend
pub trait CameraDriver: Send {
    /// Begin capturing
    fn start(&mut self) -> bool;

    /// Stop capturing
    fn stop(&mut self);

    /// Deliver pending frames to `on_frame`, returns whether any arrived.
    fn poll(&mut self, on_frame: &mut dyn FnMut(CameraFrame<'_>)) -> bool;

    /// Release backend resources
    fn free(&mut self);
}

/// A registered camera backend
pub type CameraDescriptor = BackendDescriptor<CameraParams, Box<dyn CameraDriver>>;

/// Camera that emits a flat test frame
#[derive(Debug)]
pub struct NullCamera {
    frame: Vec<u32>,
    width: u32,
    height: u32,
    capturing: bool,
}

impl NullCamera {
    pub fn new(params: &CameraParams) -> Self {
        let width = params.width.max(1);
        let height = params.height.max(1);
        Self {
            frame: vec![0xff80_8080; (width * height) as usize],
            width,
            height,
            capturing: false,
        }
    }

    /// Registry entry for this backend
    pub fn descriptor() -> CameraDescriptor {
        CameraDescriptor::new("null", rp_core::Capabilities::empty(), |params| {
            Some(Box::new(NullCamera::new(params)) as Box<dyn CameraDriver>)
        })
    }
}

impl CameraDriver for NullCamera {
    fn start(&mut self) -> bool {
        self.capturing = true;
        true
    }

    fn stop(&mut self) {
        self.capturing = false;
    }

    fn poll(&mut self, on_frame: &mut dyn FnMut(CameraFrame<'_>)) -> bool {
        if !self.capturing {
            return false;
        }
        on_frame(CameraFrame {
            pixels: &self.frame,
            width: self.width,
            height: self.height,
            pitch: self.width as usize,
        });
        true
    }

    fn free(&mut self) {
        self.capturing = false;
    }
}
