//! CPU software filters
//!
//! Filters upscale the core's frame on the CPU before it reaches the
//! backend. They are selected by the file stem of the configured filter
//! path, so `filters/scanline2x.filt` picks the scanline filter.

use crate::driver::VideoFrame;
use rp_core::{FilterError, PixelFormat};
use std::path::Path;

/// Names accepted by [`load_filter`]
pub const FILTER_NAMES: [&str; 2] = ["nearest2x", "scanline2x"];

/// A CPU frame filter
pub trait SoftFilter: Send {
    fn ident(&self) -> &'static str;

    /// Whether frames in `format` can be filtered
    fn supports(&self, format: PixelFormat) -> bool;

    /// Format of filtered frames for input in `format`
    fn output_format(&self, input: PixelFormat) -> PixelFormat {
        input
    }

    /// Size of the filtered frame for an input of `width` x `height`
    fn output_size(&self, width: u32, height: u32) -> (u32, u32);

    /// Filter `input` into `output`, whose rows are `out_pitch` bytes apart.
    fn process(&mut self, input: &VideoFrame<'_>, output: &mut [u8], out_pitch: usize);
}

/// Load a builtin filter by the stem of `path` for frames in `format`.
pub fn load_filter(path: &Path, format: PixelFormat) -> Result<Box<dyn SoftFilter>, FilterError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let filter: Box<dyn SoftFilter> = match name.as_str() {
        "nearest2x" => Box::new(Nearest2x),
        "scanline2x" => Box::new(Scanline2x),
        _ => return Err(FilterError::Unknown(path.display().to_string())),
    };

    if !filter.supports(format) {
        return Err(FilterError::UnsupportedFormat {
            filter: filter.ident().to_string(),
            format: format.to_string(),
        });
    }

    tracing::info!("Loaded software filter \"{}\"", filter.ident());
    Ok(filter)
}

fn packed_format(format: PixelFormat) -> bool {
    matches!(format, PixelFormat::Rgb565 | PixelFormat::Xrgb8888)
}

/// Double every pixel in both directions, darkening odd output rows by
/// `dim_odd_rows`.
fn scale2x(input: &VideoFrame<'_>, output: &mut [u8], out_pitch: usize, dim_odd_rows: bool) {
    let bpp = input.format.bytes_per_pixel();
    for y in 0..input.height {
        let src = input.row(y);
        for sub in 0..2usize {
            let out_y = y as usize * 2 + sub;
            let dst = &mut output[out_y * out_pitch..out_y * out_pitch + src.len() * 2];
            for (pixel, out) in src.chunks_exact(bpp).zip(dst.chunks_exact_mut(bpp * 2)) {
                let (left, right) = out.split_at_mut(bpp);
                left.copy_from_slice(pixel);
                if sub == 1 && dim_odd_rows {
                    dim(left, input.format);
                }
                right.copy_from_slice(left);
            }
        }
    }
}

/// Halve every channel of one pixel in place.
fn dim(pixel: &mut [u8], format: PixelFormat) {
    match format {
        PixelFormat::Xrgb8888 => {
            let p = u32::from_ne_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]);
            pixel.copy_from_slice(&((p >> 1) & 0x007f_7f7f).to_ne_bytes());
        }
        _ => {
            let p = u16::from_ne_bytes([pixel[0], pixel[1]]);
            pixel.copy_from_slice(&((p >> 1) & 0x7bef).to_ne_bytes());
        }
    }
}

/// Nearest-neighbour 2x upscale
#[derive(Debug, Default)]
pub struct Nearest2x;

impl SoftFilter for Nearest2x {
    fn ident(&self) -> &'static str {
        "nearest2x"
    }

    fn supports(&self, format: PixelFormat) -> bool {
        packed_format(format)
    }

    fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width * 2, height * 2)
    }

    fn process(&mut self, input: &VideoFrame<'_>, output: &mut [u8], out_pitch: usize) {
        scale2x(input, output, out_pitch, false);
    }
}

/// 2x upscale with every second line at half brightness
#[derive(Debug, Default)]
pub struct Scanline2x;

impl SoftFilter for Scanline2x {
    fn ident(&self) -> &'static str {
        "scanline2x"
    }

    fn supports(&self, format: PixelFormat) -> bool {
        packed_format(format)
    }

    fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width * 2, height * 2)
    }

    fn process(&mut self, input: &VideoFrame<'_>, output: &mut [u8], out_pitch: usize) {
        scale2x(input, output, out_pitch, true);
    }
}
