//! retroplex - headless frontend driver host
//!
//! Opens the configured drivers, feeds them a generated test core for a
//! number of frames and tears everything down again.
//!
//! Usage: `retroplex [FRAMES]`

use anyhow::Context;
use rp_core::{Config, DriverError, PixelFormat, SystemAvInfo, SystemInfo, SystemTiming};
use rp_driver::{Registries, RuntimeContext};
use rp_video::VideoFrame;

const DEFAULT_FRAMES: u64 = 600;
const CORE_FPS: f64 = 60.0;
const CORE_SAMPLE_RATE: f64 = 48000.0;

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    rp_core::logging::init(config.debug.log_level);

    let frames = match std::env::args().nth(1) {
        Some(arg) => arg.parse().with_context(|| format!("Invalid frame count \"{}\"", arg))?,
        None => DEFAULT_FRAMES,
    };

    tracing::info!("Starting retroplex");
    let registries = Registries::builtin();
    for (category, names) in registries.summary() {
        tracing::debug!("Available {} drivers: {}", category, names.join(", "));
    }

    let mut ctx = RuntimeContext::new(config, registries, test_core());
    if let Err(e) = run(&mut ctx, frames) {
        tracing::error!("{}", e);
        ctx.shutdown();
        if let Some(code) = e.exit_code() {
            std::process::exit(code);
        }
        return Err(e.into());
    }

    if let Some(fps) = ctx.driver_monitor_fps_statistics() {
        tracing::info!("Estimated monitor refresh rate: {:.3} Hz", fps.refresh_rate);
    }
    ctx.shutdown();
    tracing::info!("Ran {} frames", frames);
    Ok(())
}

fn test_core() -> SystemInfo {
    SystemInfo {
        av_info: SystemAvInfo {
            timing: SystemTiming {
                fps: CORE_FPS,
                sample_rate: CORE_SAMPLE_RATE,
            },
            ..Default::default()
        },
        pixel_format: PixelFormat::Xrgb8888,
        ..Default::default()
    }
}

fn run(ctx: &mut RuntimeContext, frames: u64) -> Result<(), DriverError> {
    ctx.init_drivers()?;

    let geometry = ctx.system().av_info.geometry;
    let (width, height) = (geometry.base_width, geometry.base_height);
    let pitch = width as usize * 4;
    let mut pixels = vec![0u8; pitch * height as usize];

    let samples_per_frame = (CORE_SAMPLE_RATE / CORE_FPS) as usize;
    let mut audio = vec![0i16; samples_per_frame * 2];
    let mut phase = 0.0f64;
    let mut audio_failed = false;

    for frame in 0..frames {
        if !ctx.video_alive() {
            tracing::info!("Video window closed");
            break;
        }
        ctx.input_poll();

        draw_test_pattern(&mut pixels, width, height, frame);
        let video = VideoFrame::new(&pixels, width, height, pitch, PixelFormat::Xrgb8888);
        match ctx.video_frame(Some(&video)) {
            Ok(()) => {}
            // The backend gets another chance next frame
            Err(e) if !e.is_fatal() => tracing::warn!("Frame {}: {}", frame, e),
            Err(e) => return Err(e),
        }

        // 440 Hz tone on both channels
        for pair in audio.chunks_exact_mut(2) {
            let s = (phase.sin() * 8000.0) as i16;
            pair[0] = s;
            pair[1] = s;
            phase = (phase + 2.0 * std::f64::consts::PI * 440.0 / CORE_SAMPLE_RATE) % std::f64::consts::TAU;
        }
        if !ctx.write_audio_samples(&audio) && !audio_failed {
            tracing::warn!("Audio was disabled after a failed write");
            audio_failed = true;
        }
    }
    Ok(())
}

/// Scrolling gradient
fn draw_test_pattern(pixels: &mut [u8], width: u32, height: u32, frame: u64) {
    let shift = (frame % 256) as u32;
    for y in 0..height {
        for x in 0..width {
            let offset = (y * width + x) as usize * 4;
            let r = (x * 255 / width.max(1) + shift) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            // XRGB8888 in memory order: blue, green, red, unused
            pixels[offset..offset + 4].copy_from_slice(&[0x80, g, r, 0xff]);
        }
    }
}
