//! Configuration system for the retroplex frontend

use crate::error::ConfigError;
use crate::system::PixelFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
    pub camera: CameraConfig,
    pub location: LocationConfig,
    pub osk: OskConfig,
    pub menu: MenuConfig,
    pub debug: DebugConfig,
}

/// Video settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub driver: String,
    pub vsync: bool,
    /// Refresh rate of the display in Hz
    pub refresh_rate: f32,
    /// Run the video driver on its own thread
    pub threaded: bool,
    pub fullscreen: bool,
    pub fullscreen_x: u32,
    pub fullscreen_y: u32,
    pub xscale: f32,
    pub yscale: f32,
    pub force_aspect: bool,
    pub smooth: bool,
    pub aspect_ratio: AspectRatioMode,
    /// Aspect ratio used by `AspectRatioMode::Config`, `<= 0.0` means auto
    pub aspect_ratio_value: f32,
    pub custom_viewport: CustomViewport,
    /// Rotation in 90 degree steps
    pub rotation: u32,
    /// Software filter to apply, empty for none
    pub filter_path: PathBuf,
    /// Directory scanned for shader presets, empty for none
    pub shader_dir: PathBuf,
    /// Keep the hardware-render context alive across driver reinits
    pub cache_context: bool,
}

/// How the display aspect ratio is chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum AspectRatioMode {
    Ratio4x3,
    Ratio16x9,
    Ratio16x10,
    Ratio16x15,
    Ratio1x1,
    Ratio2x1,
    Ratio3x2,
    Ratio3x4,
    Ratio5x4,
    Ratio8x7,
    Ratio19x12,
    /// The value of `VideoConfig::aspect_ratio_value`
    Config,
    /// Square pixels from the core's base size
    Square,
    /// Whatever the core reports
    #[default]
    Core,
    /// The custom viewport's size
    Custom,
}

impl AspectRatioMode {
    /// Every mode, in menu order.
    pub const ALL: [AspectRatioMode; 15] = [
        Self::Ratio4x3,
        Self::Ratio16x9,
        Self::Ratio16x10,
        Self::Ratio16x15,
        Self::Ratio1x1,
        Self::Ratio2x1,
        Self::Ratio3x2,
        Self::Ratio3x4,
        Self::Ratio5x4,
        Self::Ratio8x7,
        Self::Ratio19x12,
        Self::Config,
        Self::Square,
        Self::Core,
        Self::Custom,
    ];

    /// The ratio of a fixed mode, `None` for modes resolved at runtime.
    pub fn fixed_ratio(&self) -> Option<f32> {
        let (num, den) = match self {
            Self::Ratio4x3 => (4.0, 3.0),
            Self::Ratio16x9 => (16.0, 9.0),
            Self::Ratio16x10 => (16.0, 10.0),
            Self::Ratio16x15 => (16.0, 15.0),
            Self::Ratio1x1 => (1.0, 1.0),
            Self::Ratio2x1 => (2.0, 1.0),
            Self::Ratio3x2 => (3.0, 2.0),
            Self::Ratio3x4 => (3.0, 4.0),
            Self::Ratio5x4 => (5.0, 4.0),
            Self::Ratio8x7 => (8.0, 7.0),
            Self::Ratio19x12 => (19.0, 12.0),
            Self::Config | Self::Square | Self::Core | Self::Custom => return None,
        };
        Some(num / den)
    }
}

/// User-defined viewport
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CustomViewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub driver: String,
    pub enable: bool,
    /// Output device, empty for the driver default
    pub device: String,
    /// Output sample rate in Hz
    pub out_rate: u32,
    /// Desired latency in milliseconds
    pub latency: u32,
    /// Let audio writes block to pace emulation
    pub sync: bool,
    /// Dynamically adjust the resampling ratio from buffer occupancy
    pub rate_control: bool,
    /// Maximum relative ratio adjustment used by rate control
    pub rate_control_delta: f64,
    pub resampler: String,
    pub mute: bool,
}

/// Input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub driver: String,
}

/// Camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub driver: String,
    pub device: String,
    pub allow: bool,
}

/// Location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub driver: String,
    pub allow: bool,
}

/// On-screen keyboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OskConfig {
    pub driver: String,
    pub enable: bool,
}

/// Menu settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub driver: String,
    pub enable: bool,
    /// Keep the menu alive across driver reinits
    pub persist: bool,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    /// Pixel format assumed for cores that never report one
    pub default_pixel_format: PixelFormat,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

// Default implementations

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            vsync: true,
            refresh_rate: 59.94,
            threaded: false,
            fullscreen: false,
            fullscreen_x: 0,
            fullscreen_y: 0,
            xscale: 3.0,
            yscale: 3.0,
            force_aspect: true,
            smooth: true,
            aspect_ratio: AspectRatioMode::default(),
            aspect_ratio_value: -1.0,
            custom_viewport: CustomViewport::default(),
            rotation: 0,
            filter_path: PathBuf::new(),
            shader_dir: PathBuf::new(),
            cache_context: false,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            enable: true,
            device: String::new(),
            out_rate: 48000,
            latency: 64,
            sync: true,
            rate_control: true,
            rate_control_delta: 0.005,
            resampler: "sinc".to_string(),
            mute: false,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            device: String::new(),
            allow: false,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            allow: false,
        }
    }
}

impl Default for OskConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            enable: false,
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            enable: true,
            persist: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            default_pixel_format: PixelFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("retroplex")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.video.vsync);
        assert!(config.audio.sync);
        assert_eq!(config.audio.out_rate, 48000);
        assert_eq!(config.video.driver, "null");
        assert!(config.menu.persist);
        assert!(config.video.filter_path.as_os_str().is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.video.aspect_ratio = AspectRatioMode::Ratio16x9;
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.audio.out_rate, config.audio.out_rate);
        assert_eq!(parsed.video.aspect_ratio, AspectRatioMode::Ratio16x9);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[audio]\nsync = false\n").unwrap();
        assert!(!parsed.audio.sync);
        assert_eq!(parsed.audio.resampler, "sinc");
        assert!(parsed.video.vsync);
    }
}
