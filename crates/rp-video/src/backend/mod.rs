//! Video backends

pub mod null;

pub use null::NullVideoBackend;
