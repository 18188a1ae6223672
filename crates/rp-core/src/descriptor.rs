//! Shared vocabulary for backend descriptors
//!
//! Every driver category (audio, video, input, ...) publishes an ordered
//! list of descriptors. A descriptor names one backend, advertises what
//! optional operations it supports and knows how to construct it.

use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

/// Driver categories managed by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverCategory {
    Audio,
    Video,
    Input,
    Camera,
    Location,
    Osk,
    Menu,
}

impl DriverCategory {
    /// All categories, in initialization order.
    pub const ALL: [DriverCategory; 7] = [
        Self::Video,
        Self::Input,
        Self::Audio,
        Self::Camera,
        Self::Location,
        Self::Osk,
        Self::Menu,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Input => "input",
            Self::Camera => "camera",
            Self::Location => "location",
            Self::Osk => "osk",
            Self::Menu => "menu",
        }
    }
}

impl fmt::Display for DriverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Optional operations a backend implements
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// Audio: accepts 32-bit float samples
        const FLOAT_AUDIO   = 0x0001;
        /// Audio: reports its total buffer size
        const BUFFER_SIZE   = 0x0002;
        /// Audio: reports free space in its buffer
        const WRITE_AVAIL   = 0x0004;
        /// Video: renders into a frame buffer object
        const FBO           = 0x0010;
        /// Video: exposes the poke interface
        const POKE          = 0x0020;
        /// Video: reports its viewport
        const VIEWPORT_INFO = 0x0040;
        /// Video: supports output rotation
        const ROTATION      = 0x0080;
        /// Video: owns a windowing context driver
        const CONTEXT       = 0x0100;
        /// Input: supports rumble effects
        const RUMBLE        = 0x1000;
        /// Input: supports motion sensors
        const SENSORS       = 0x2000;
    }
}

impl Capabilities {
    /// Both buffer queries needed for dynamic rate control.
    pub const RATE_CONTROL: Capabilities =
        Capabilities::BUFFER_SIZE.union(Capabilities::WRITE_AVAIL);
}

/// A registered backend implementation
pub trait Descriptor {
    /// Identifier matched against the configured driver name
    fn ident(&self) -> &str;

    /// Optional operations supported by the backend
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

/// Constructor stored in a [`BackendDescriptor`]
pub type InitFn<P, H> = Arc<dyn Fn(&P) -> Option<H> + Send + Sync>;

/// A named backend constructor taking `P` and producing a handle `H`
pub struct BackendDescriptor<P, H> {
    ident: &'static str,
    capabilities: Capabilities,
    init: InitFn<P, H>,
}

impl<P, H> BackendDescriptor<P, H> {
    pub fn new<F>(ident: &'static str, capabilities: Capabilities, init: F) -> Self
    where
        F: Fn(&P) -> Option<H> + Send + Sync + 'static,
    {
        Self {
            ident,
            capabilities,
            init: Arc::new(init),
        }
    }

    /// Construct the backend, `None` if it could not be opened.
    pub fn init(&self, params: &P) -> Option<H> {
        (self.init)(params)
    }
}

impl<P, H> Clone for BackendDescriptor<P, H> {
    fn clone(&self) -> Self {
        Self {
            ident: self.ident,
            capabilities: self.capabilities,
            init: Arc::clone(&self.init),
        }
    }
}

impl<P, H> Descriptor for BackendDescriptor<P, H> {
    fn ident(&self) -> &str {
        self.ident
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

impl<P, H> fmt::Debug for BackendDescriptor<P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("ident", &self.ident)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
