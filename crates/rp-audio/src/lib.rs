//! Audio drivers for retroplex
//!
//! Backend interface, the builtin backends, sample conversion, resampling
//! and the threaded wrapper used by callback-driven cores.

pub mod backend;
pub mod convert;
pub mod driver;
pub mod resampler;
pub mod threaded;

pub use backend::NullAudioBackend;
#[cfg(feature = "cpal")]
pub use backend::CpalAudioBackend;
pub use driver::{
    AudioDescriptor, AudioDriver, AudioInitParams, Samples, AUDIO_CHUNK_SIZE_BLOCKING,
    AUDIO_CHUNK_SIZE_NONBLOCKING, AUDIO_MAX_RATIO,
};
pub use resampler::{Resampler, ResamplerQuality};
pub use threaded::ThreadedAudio;
