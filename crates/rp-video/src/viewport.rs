//! Aspect ratio and window size
//!
//! Resolves the configured aspect ratio mode against the core's geometry
//! and computes the window size requested from the video backend.

use rp_core::config::{AspectRatioMode, CustomViewport, VideoConfig};
use rp_core::GameGeometry;

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Aspect ratios of the modes that depend on the core or the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatios {
    /// `AspectRatioMode::Config`
    pub config: f32,
    /// `AspectRatioMode::Square`, 1:1 pixels
    pub square: f32,
    /// `AspectRatioMode::Core`
    pub core: f32,
    /// `AspectRatioMode::Custom`
    pub custom: f32,
    /// Reduced base size, e.g. `(4, 3)` for 320x240
    pub square_label: (u32, u32),
}

impl AspectRatios {
    pub fn compute(geometry: &GameGeometry, config_value: f32, custom: &CustomViewport) -> Self {
        let base_width = geometry.base_width.max(1);
        let base_height = geometry.base_height.max(1);
        let pixel_ratio = base_width as f32 / base_height as f32;

        let divisor = gcd(base_width, base_height).max(1);
        let square_label = (base_width / divisor, base_height / divisor);
        let square = square_label.0 as f32 / square_label.1 as f32;

        let core = if geometry.aspect_ratio > 0.0 {
            geometry.aspect_ratio
        } else {
            pixel_ratio
        };

        let config = if config_value > 0.0 { config_value } else { core };

        let custom = if custom.width > 0 && custom.height > 0 {
            custom.width as f32 / custom.height as f32
        } else {
            core
        };

        Self {
            config,
            square,
            core,
            custom,
            square_label,
        }
    }

    /// Ratio used for `mode`.
    pub fn value(&self, mode: AspectRatioMode) -> f32 {
        match mode {
            AspectRatioMode::Config => self.config,
            AspectRatioMode::Square => self.square,
            AspectRatioMode::Core => self.core,
            AspectRatioMode::Custom => self.custom,
            fixed => fixed.fixed_ratio().unwrap_or(self.core),
        }
    }
}

/// Window size requested from the backend; zero means "backend decides"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn compute(geometry: &GameGeometry, video: &VideoConfig, aspect_ratio: f32) -> Self {
        if video.fullscreen {
            return Self {
                width: video.fullscreen_x,
                height: video.fullscreen_y,
            };
        }

        let base_height = geometry.base_height as f32;
        // Round the base width first so integer scales stay exact
        let base_width = if video.force_aspect {
            (base_height * aspect_ratio).round()
        } else {
            geometry.base_width as f32
        };

        Self {
            width: (base_width * video.xscale).round() as u32,
            height: (base_height * video.yscale).round() as u32,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(width: u32, height: u32, aspect: f32) -> GameGeometry {
        GameGeometry {
            base_width: width,
            base_height: height,
            max_width: width,
            max_height: height,
            aspect_ratio: aspect,
        }
    }

    #[test]
    fn test_square_pixels() {
        let ratios = AspectRatios::compute(&geometry(256, 224, 0.0), -1.0, &CustomViewport::default());
        assert_eq!(ratios.square_label, (8, 7));
        assert!((ratios.square - 8.0 / 7.0).abs() < 1e-6);
        // No core ratio and no config value: both fall back to pixel ratio
        assert_eq!(ratios.core, ratios.config);
        assert_eq!(ratios.custom, ratios.core);
    }

    #[test]
    fn test_mode_lookup() {
        let custom = CustomViewport {
            x: 0,
            y: 0,
            width: 300,
            height: 200,
        };
        let ratios = AspectRatios::compute(&geometry(320, 240, 1.5), 2.0, &custom);
        assert_eq!(ratios.value(AspectRatioMode::Core), 1.5);
        assert_eq!(ratios.value(AspectRatioMode::Config), 2.0);
        assert_eq!(ratios.value(AspectRatioMode::Custom), 1.5);
        assert!((ratios.value(AspectRatioMode::Ratio16x9) - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_size() {
        let geom = geometry(256, 224, 4.0 / 3.0);
        let mut video = VideoConfig::default();
        video.xscale = 3.0;
        video.yscale = 3.0;

        video.force_aspect = true;
        // round(224 * 4/3) = 299
        assert_eq!(
            WindowSize::compute(&geom, &video, 4.0 / 3.0),
            WindowSize { width: 897, height: 672 }
        );

        video.force_aspect = false;
        assert_eq!(
            WindowSize::compute(&geom, &video, 4.0 / 3.0),
            WindowSize { width: 768, height: 672 }
        );

        video.fullscreen = true;
        video.fullscreen_x = 0;
        video.fullscreen_y = 0;
        assert!(WindowSize::compute(&geom, &video, 1.0).is_unspecified());
    }
}
