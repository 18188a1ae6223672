//! Video drivers for retroplex
//!
//! The video backend interface, the builtin backends, the threaded wrapper
//! and the CPU-side pixel pipeline (format conversion and software filters)
//! that sits between the core and the backend.

pub mod backend;
pub mod converter;
pub mod driver;
pub mod filter;
pub mod message;
pub mod pipeline;
pub mod shader_dir;
pub mod threaded;
pub mod viewport;

pub use backend::NullVideoBackend;
pub use converter::PointConverter;
pub use driver::{
    ContextDriver, VideoDescriptor, VideoDriver, VideoFrame, VideoInfo, VideoInit, VideoPoke, Viewport,
    WindowEvent,
};
pub use filter::{load_filter, SoftFilter};
pub use message::MessageQueue;
pub use pipeline::{PixelPath, PixelPipeline, SCALE_BASE};
pub use shader_dir::ShaderDir;
pub use threaded::ThreadedVideo;
pub use viewport::{AspectRatios, WindowSize};
