//! Pixel format conversion
//!
//! Cores that still emit 0RGB1555 get their frames converted to RGB565
//! before anything else touches them.

use crate::driver::VideoFrame;
use rp_core::{PixelFormat, VideoError};

/// Convert one 0RGB1555 pixel to RGB565.
///
/// Green gains a low bit copied from its top bit so full intensity stays
/// full intensity.
#[inline]
pub fn rgb1555_to_rgb565(pixel: u16) -> u16 {
    let red_green = (pixel << 1) & ((0x1f << 11) | (0x1f << 6));
    let blue = pixel & 0x1f;
    let green_low = (pixel >> 4) & (1 << 5);
    red_green | green_low | blue
}

/// Point-sampled 0RGB1555 to RGB565 converter with a square output buffer
#[derive(Debug)]
pub struct PointConverter {
    size: u32,
    buffer: Vec<u16>,
}

impl PointConverter {
    /// Allocate a converter for frames up to `size` x `size` pixels.
    pub fn new(size: u32) -> Result<Self, VideoError> {
        let len = (size as usize)
            .checked_mul(size as usize)
            .filter(|&len| len > 0)
            .ok_or_else(|| VideoError::InvalidFrame(format!("converter size {}", size)))?;
        Ok(Self {
            size,
            buffer: vec![0; len],
        })
    }

    /// Side length of the output buffer
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Output buffer length in pixels
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Convert `frame` into the internal buffer. The result has tightly
    /// packed rows.
    pub fn convert(&mut self, frame: &VideoFrame<'_>) -> Result<VideoFrame<'_>, VideoError> {
        if frame.format != PixelFormat::Rgb1555 {
            return Err(VideoError::InvalidFrame(format!(
                "converter expects 0RGB1555, got {}",
                frame.format
            )));
        }
        if frame.width > self.size || frame.height > self.size {
            return Err(VideoError::InvalidFrame(format!(
                "{}x{} frame exceeds converter size {}",
                frame.width, frame.height, self.size
            )));
        }

        let width = frame.width as usize;
        for y in 0..frame.height {
            let out = &mut self.buffer[y as usize * width..(y as usize + 1) * width];
            for (dst, src) in out.iter_mut().zip(frame.row(y).chunks_exact(2)) {
                *dst = rgb1555_to_rgb565(u16::from_ne_bytes([src[0], src[1]]));
            }
        }

        let used = width * frame.height as usize;
        Ok(VideoFrame::new(
            bytemuck::cast_slice(&self.buffer[..used]),
            frame.width,
            frame.height,
            width * 2,
            PixelFormat::Rgb565,
        ))
    }
}
