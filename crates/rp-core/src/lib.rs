//! Core types for the retroplex frontend
//!
//! This crate provides the foundational types, error handling,
//! configuration, and logging infrastructure shared by the driver crates.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod system;

pub use config::Config;
pub use descriptor::{BackendDescriptor, Capabilities, Descriptor, DriverCategory, InitFn};
pub use error::{AudioError, ConfigError, DriverError, FilterError, FrontendError, Result, VideoError};
pub use system::{
    AudioCallback, GameGeometry, HwContextType, HwRenderCallback, PixelFormat, SystemAvInfo, SystemInfo,
    SystemTiming,
};
