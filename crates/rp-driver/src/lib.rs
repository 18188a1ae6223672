//! Driver layer for the retroplex frontend
//!
//! This crate ties the backend crates together:
//! - Backend registries and driver selection
//! - The lifecycle of every driver category
//! - Audio input rate and vsync policy
//! - The non-blocking state coordinator
//! - The audio and video paths between the core and the backends
//! - Frame time and audio buffer statistics

pub mod audio_path;
pub mod builtin;
pub mod context;
pub mod lifecycle;
pub mod menu;
pub mod nonblock;
pub mod passthrough;
pub mod rates;
pub mod registry;
pub mod slot;
pub mod stats;
pub mod video_path;

pub use audio_path::AudioPath;
pub use builtin::Registries;
pub use context::{RuntimeContext, TimingState};
pub use menu::{MenuDescriptor, MenuDriver, NullMenu};
pub use nonblock::NonblockPlan;
pub use rates::{compute_input_rate, RateDecision};
pub use registry::Registry;
pub use slot::{ActiveDriver, LifecycleState, Slot};
pub use stats::{AudioBufferStats, MonitorFps, SampleRing};
pub use video_path::VideoPath;
