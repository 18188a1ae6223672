//! Error types for the retroplex frontend

use crate::descriptor::DriverCategory;
use thiserror::Error;

/// Process exit code used when driver setup cannot continue.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Main error type for the frontend
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Video error: {0}")]
    Video(#[from] VideoError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Driver selection and lifecycle errors
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("No {0} drivers are registered")]
    NoDrivers(DriverCategory),

    #[error("Cannot open {category} driver \"{ident}\"")]
    InitFailed {
        category: DriverCategory,
        ident: String,
    },

    #[error("Cannot start threaded {0} driver")]
    ThreadedInitFailed(DriverCategory),

    #[error("Failed to initialize pixel converter: {0}")]
    PixelConverter(String),

    #[error("Video frame failed: {0}")]
    FrameFailed(#[from] VideoError),

    #[error("No {0} driver is active")]
    NotActive(DriverCategory),
}

impl DriverError {
    /// Whether the frontend cannot keep running after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::NoDrivers(_)
            | Self::ThreadedInitFailed(_)
            | Self::PixelConverter(_) => true,
            Self::InitFailed { category, .. } => {
                matches!(category, DriverCategory::Video | DriverCategory::Input)
            }
            Self::FrameFailed(_) | Self::NotActive(_) => false,
        }
    }

    /// Exit code the binary should terminate with, if any.
    pub fn exit_code(&self) -> Option<i32> {
        self.is_fatal().then_some(FATAL_EXIT_CODE)
    }
}

/// Audio backend errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No output device available")]
    NoDevice,

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Unknown resampler: {0}")]
    UnknownResampler(String),

    #[error("Invalid channel layout: {0} samples")]
    ChannelLayout(usize),

    #[error("Audio driver is stopped")]
    Stopped,
}

/// Video backend errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Graphics device lost")]
    DeviceLost,

    #[error("Failed to restore graphics device: {0}")]
    RestoreFailed(String),

    #[error("Video worker thread is gone")]
    WorkerGone,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Software filter errors
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Unknown software filter: {0}")]
    Unknown(String),

    #[error("Software filters are unavailable with hardware rendering")]
    HardwareRender,

    #[error("Unsupported input format for filter {filter}: {format}")]
    UnsupportedFormat { filter: String, format: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for frontend operations
pub type Result<T> = std::result::Result<T, FrontendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DriverError::InitFailed {
            category: DriverCategory::Video,
            ident: "gl".to_string(),
        };
        assert_eq!(format!("{}", err), "Cannot open video driver \"gl\"");

        let err = DriverError::NoDrivers(DriverCategory::Audio);
        assert_eq!(format!("{}", err), "No audio drivers are registered");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(DriverError::NoDrivers(DriverCategory::Audio).is_fatal());
        assert!(DriverError::InitFailed {
            category: DriverCategory::Input,
            ident: "null".to_string(),
        }
        .is_fatal());
        assert!(!DriverError::InitFailed {
            category: DriverCategory::Audio,
            ident: "null".to_string(),
        }
        .is_fatal());
        assert!(!DriverError::FrameFailed(VideoError::DeviceLost).is_fatal());
        assert_eq!(
            DriverError::NoDrivers(DriverCategory::Video).exit_code(),
            Some(FATAL_EXIT_CODE)
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: FrontendError = DriverError::NotActive(DriverCategory::Menu).into();
        assert!(matches!(err, FrontendError::Driver(_)));
    }
}
