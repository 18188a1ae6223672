//! Null video backend
//!
//! Accepts frames without presenting them. It keeps enough state (frame
//! counts, last frame size, a simulated device) to drive the frontend
//! headless and to exercise device-loss recovery.

use crate::driver::{VideoDescriptor, VideoDriver, VideoFrame, VideoInfo, VideoInit, VideoPoke, Viewport};
use rp_core::{Capabilities, VideoError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Null video backend
#[derive(Debug)]
pub struct NullVideoBackend {
    info: VideoInfo,
    frames: u64,
    dupes: u64,
    last_size: (u32, u32),
    last_msg: Option<String>,
    nonblock: bool,
    rotation: u32,
    aspect_ratio: f32,
    shader: Option<PathBuf>,
    /// The simulated device was lost and must be restored before drawing
    needs_restore: bool,
    /// Restore attempts that should still fail
    failing_restores: u32,
    restores: u64,
    /// Set on free when the frontend asked to keep the context
    context_cache: Option<Arc<AtomicBool>>,
}

impl NullVideoBackend {
    pub fn new(info: &VideoInfo) -> Self {
        Self {
            info: info.clone(),
            frames: 0,
            dupes: 0,
            last_size: (0, 0),
            last_msg: None,
            nonblock: !info.vsync,
            rotation: 0,
            aspect_ratio: 0.0,
            shader: None,
            needs_restore: false,
            failing_restores: 0,
            restores: 0,
            context_cache: None,
        }
    }

    /// Registry entry for this backend
    ///
    /// With `cache_context` requested, a freed instance leaves its context
    /// behind and the next instance picks it up and acknowledges it.
    pub fn descriptor() -> VideoDescriptor {
        let cached = Arc::new(AtomicBool::new(false));
        VideoDescriptor::new(
            "null",
            Capabilities::POKE | Capabilities::VIEWPORT_INFO | Capabilities::ROTATION,
            move |info| {
                let ack = info.cache_context && cached.swap(false, Ordering::SeqCst);
                let mut backend = NullVideoBackend::new(info);
                if info.cache_context {
                    backend.context_cache = Some(Arc::clone(&cached));
                }
                Some(VideoInit::new(Box::new(backend)).with_context_cache_ack(ack))
            },
        )
    }

    /// Mark the device as lost. The next `failures` restore attempts fail.
    pub fn lose_device(&mut self, failures: u32) {
        tracing::warn!("Null video: device lost");
        self.needs_restore = true;
        self.failing_restores = failures;
    }

    fn restore(&mut self) -> bool {
        self.restores += 1;
        if self.failing_restores > 0 {
            self.failing_restores -= 1;
            return false;
        }
        self.needs_restore = false;
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn dupes(&self) -> u64 {
        self.dupes
    }

    pub fn last_size(&self) -> (u32, u32) {
        self.last_size
    }

    pub fn last_msg(&self) -> Option<&str> {
        self.last_msg.as_deref()
    }

    pub fn is_nonblock(&self) -> bool {
        self.nonblock
    }

    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    pub fn restores(&self) -> u64 {
        self.restores
    }
}

impl VideoDriver for NullVideoBackend {
    fn frame(&mut self, frame: Option<&VideoFrame<'_>>, msg: Option<&str>) -> Result<(), VideoError> {
        let Some(frame) = frame else {
            self.dupes += 1;
            return Ok(());
        };

        if self.needs_restore && !self.restore() {
            return Err(VideoError::RestoreFailed("null device unavailable".to_string()));
        }

        frame.validate()?;
        self.frames += 1;
        self.last_size = (frame.width, frame.height);
        if let Some(msg) = msg {
            self.last_msg = Some(msg.to_string());
        }
        Ok(())
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
    }

    fn alive(&mut self) -> bool {
        true
    }

    fn focus(&self) -> bool {
        true
    }

    fn free(&mut self) {
        if let Some(cached) = self.context_cache.take() {
            cached.store(true, Ordering::SeqCst);
        }
        tracing::debug!("Null video freed after {} frames ({} dupes)", self.frames, self.dupes);
    }

    fn set_shader(&mut self, path: Option<&Path>) -> bool {
        self.shader = path.map(Path::to_path_buf);
        true
    }

    fn set_rotation(&mut self, rotation: u32) {
        self.rotation = rotation % 4;
    }

    fn viewport_info(&self) -> Option<Viewport> {
        Some(Viewport {
            x: 0,
            y: 0,
            width: self.info.width,
            height: self.info.height,
            full_width: self.info.width,
            full_height: self.info.height,
        })
    }

    fn poke(&mut self) -> Option<&mut dyn VideoPoke> {
        Some(self)
    }
}

impl VideoPoke for NullVideoBackend {
    fn set_aspect_ratio(&mut self, ratio: f32) {
        self.aspect_ratio = ratio;
    }

    fn set_osd_msg(&mut self, msg: &str) {
        self.last_msg = Some(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::PixelFormat;

    fn frame(data: &[u8]) -> VideoFrame<'_> {
        VideoFrame::new(data, 4, 2, 8, PixelFormat::Rgb565)
    }

    #[test]
    fn test_frames_and_dupes() {
        let mut video = NullVideoBackend::new(&VideoInfo::default());
        let data = [0u8; 16];
        video.frame(Some(&frame(&data)), Some("hello")).unwrap();
        video.frame(None, None).unwrap();

        assert_eq!(video.frames(), 1);
        assert_eq!(video.dupes(), 1);
        assert_eq!(video.last_size(), (4, 2));
        assert_eq!(video.last_msg(), Some("hello"));
    }

    #[test]
    fn test_device_restore() {
        let mut video = NullVideoBackend::new(&VideoInfo::default());
        let data = [0u8; 16];

        video.lose_device(1);
        assert!(matches!(
            video.frame(Some(&frame(&data)), None),
            Err(VideoError::RestoreFailed(_))
        ));
        assert_eq!(video.frames(), 0);

        // Second attempt succeeds
        video.frame(Some(&frame(&data)), None).unwrap();
        assert_eq!(video.frames(), 1);
        assert_eq!(video.restores(), 2);
    }

    #[test]
    fn test_initial_nonblock_follows_vsync() {
        let info = VideoInfo {
            vsync: false,
            ..Default::default()
        };
        assert!(NullVideoBackend::new(&info).is_nonblock());
    }

    #[test]
    fn test_descriptor_acks_context_cache() {
        let info = VideoInfo {
            cache_context: true,
            ..Default::default()
        };
        let desc = NullVideoBackend::descriptor();
        let mut first = desc.init(&info).unwrap();
        assert!(!first.context_cache_ack);
        assert!(first.input.is_none());

        first.driver.free();
        let second = desc.init(&info).unwrap();
        assert!(second.context_cache_ack);
    }
}
