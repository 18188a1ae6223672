//! Audio backends

#[cfg(feature = "cpal")]
pub mod cpal_backend;
pub mod null;

#[cfg(feature = "cpal")]
pub use cpal_backend::CpalAudioBackend;
pub use null::NullAudioBackend;
