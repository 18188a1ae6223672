//! Pixel pipeline between the core and the video backend
//!
//! Rebuilt on every video (re)init. 0RGB1555 frames are converted to
//! RGB565 first; if a software filter is loaded it then runs on the
//! (converted) frame. The backend sees the output of the last stage.

use crate::converter::PointConverter;
use crate::driver::VideoFrame;
use crate::filter::{load_filter, SoftFilter};
use rp_core::{DriverError, FilterError, GameGeometry, PixelFormat, VideoError};
use std::path::Path;

/// Frame size unit: backends accept inputs up to `SCALE_BASE * scale`
pub const SCALE_BASE: u32 = 256;

/// Which stage feeds the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelPath {
    /// Frames pass through untouched
    Raw,
    /// Frames come out of the pixel converter
    Converter,
    /// Frames come out of the software filter
    Filter,
}

/// Scale needed for frames up to `width` x `height`.
pub fn input_scale(width: u32, height: u32) -> u32 {
    let max_dim = width.max(height).next_power_of_two();
    (max_dim / SCALE_BASE).max(1)
}

struct FilterStage {
    filter: Box<dyn SoftFilter>,
    scale: u32,
    max_input: (u32, u32),
    in_format: PixelFormat,
    out_format: PixelFormat,
    buffer: Vec<u8>,
}

impl FilterStage {
    fn new(path: &Path, format: PixelFormat, geometry: &GameGeometry) -> Result<Self, FilterError> {
        let filter = load_filter(path, format)?;
        let (width, height) = filter.output_size(geometry.max_width, geometry.max_height);
        let scale = input_scale(width, height);
        let out_format = filter.output_format(format);
        Ok(Self {
            scale,
            max_input: (geometry.max_width, geometry.max_height),
            in_format: format,
            out_format,
            buffer: vec![0; width as usize * height as usize * out_format.bytes_per_pixel()],
            filter,
        })
    }

    fn apply(&mut self, frame: &VideoFrame<'_>) -> Result<VideoFrame<'_>, VideoError> {
        if frame.format != self.in_format {
            return Err(VideoError::InvalidFrame(format!(
                "{} frame for a filter expecting {}",
                frame.format, self.in_format
            )));
        }
        if frame.width > self.max_input.0 || frame.height > self.max_input.1 {
            return Err(VideoError::InvalidFrame(format!(
                "{}x{} frame exceeds filter input {}x{}",
                frame.width, frame.height, self.max_input.0, self.max_input.1
            )));
        }
        let (width, height) = self.filter.output_size(frame.width, frame.height);
        let pitch = width as usize * self.out_format.bytes_per_pixel();
        let len = pitch * height as usize;
        self.filter.process(frame, &mut self.buffer[..len], pitch);
        Ok(VideoFrame::new(&self.buffer[..len], width, height, pitch, self.out_format))
    }
}

/// Converter and filter state for the active video driver
pub struct PixelPipeline {
    format: PixelFormat,
    scale: u32,
    converter: Option<PointConverter>,
    filter: Option<FilterStage>,
}

impl PixelPipeline {
    /// A pipeline that passes frames straight through.
    pub fn raw(format: PixelFormat) -> Self {
        Self {
            format,
            scale: 1,
            converter: None,
            filter: None,
        }
    }

    /// Build the pipeline for a core producing `format` frames no larger
    /// than `geometry`'s maximum size.
    ///
    /// Filter problems only disable filtering. Failing to set up the
    /// converter is fatal.
    pub fn new(
        format: PixelFormat,
        geometry: &GameGeometry,
        filter_path: Option<&Path>,
        hw_rendered: bool,
    ) -> Result<Self, DriverError> {
        let filter = filter_path.and_then(|path| {
            if hw_rendered {
                tracing::warn!("{}", FilterError::HardwareRender);
                return None;
            }
            tracing::info!("Loading softfilter from \"{}\"", path.display());
            // The filter sees frames after 0RGB1555 conversion
            let filter_format = match format {
                PixelFormat::Rgb1555 => PixelFormat::Rgb565,
                other => other,
            };
            match FilterStage::new(path, filter_format, geometry) {
                Ok(stage) => Some(stage),
                Err(e) => {
                    tracing::error!("Failed to load filter: {}", e);
                    None
                }
            }
        });

        let scale = match &filter {
            Some(stage) => stage.scale,
            None => input_scale(geometry.max_width, geometry.max_height),
        };

        let converter = if format == PixelFormat::Rgb1555 {
            tracing::warn!(
                "0RGB1555 pixel format is deprecated, and will be slower. For 15/16-bit, RGB565 format is preferred."
            );
            let converter = PointConverter::new(SCALE_BASE * scale)
                .map_err(|e| DriverError::PixelConverter(e.to_string()))?;
            Some(converter)
        } else {
            None
        };

        Ok(Self {
            format,
            scale,
            converter,
            filter,
        })
    }

    /// Core pixel format
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Input scale to report to the backend
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn path(&self) -> PixelPath {
        if self.filter.is_some() {
            PixelPath::Filter
        } else if self.converter.is_some() {
            PixelPath::Converter
        } else {
            PixelPath::Raw
        }
    }

    /// Whether the backend receives XRGB8888 frames
    pub fn output_rgb32(&self) -> bool {
        match &self.filter {
            Some(stage) => stage.out_format == PixelFormat::Xrgb8888,
            None => self.format == PixelFormat::Xrgb8888,
        }
    }

    pub fn filter_ident(&self) -> Option<&'static str> {
        self.filter.as_ref().map(|stage| stage.filter.ident())
    }

    pub fn converter(&self) -> Option<&PointConverter> {
        self.converter.as_ref()
    }

    /// Run `frame` through every active stage.
    pub fn process<'a>(&'a mut self, frame: &VideoFrame<'a>) -> Result<VideoFrame<'a>, VideoError> {
        frame.validate()?;
        if frame.format != self.format {
            return Err(VideoError::InvalidFrame(format!(
                "{} frame for a {} pipeline",
                frame.format, self.format
            )));
        }
        let mut current = *frame;
        if let Some(converter) = self.converter.as_mut() {
            current = converter.convert(&current)?;
        }
        if let Some(stage) = self.filter.as_mut() {
            current = stage.apply(&current)?;
        }
        Ok(current)
    }
}

impl std::fmt::Debug for PixelPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelPipeline")
            .field("format", &self.format)
            .field("scale", &self.scale)
            .field("path", &self.path())
            .field("filter", &self.filter_ident())
            .finish()
    }
}
