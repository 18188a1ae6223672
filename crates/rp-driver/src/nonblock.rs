//! Non-blocking state
//!
//! The frontend has one logical "run unthrottled" flag (fast-forward,
//! mismatched timing). It maps to a different blocking setting per backend.

use rp_audio::{AUDIO_CHUNK_SIZE_BLOCKING, AUDIO_CHUNK_SIZE_NONBLOCKING};

/// Blocking configuration derived from the logical non-block flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonblockPlan {
    /// Video skips waiting for vsync
    pub video: bool,
    /// Audio writes never wait for buffer space
    pub audio: bool,
    /// Samples written per audio flush
    pub chunk_size: usize,
}

impl NonblockPlan {
    pub fn new(nonblock: bool, vsync: bool, force_nonblock: bool, audio_sync: bool) -> Self {
        Self {
            video: nonblock || !vsync || force_nonblock,
            audio: if audio_sync { nonblock } else { true },
            chunk_size: chunk_size(nonblock),
        }
    }
}

/// Audio write chunk for the given non-block state
pub fn chunk_size(nonblock: bool) -> usize {
    if nonblock {
        AUDIO_CHUNK_SIZE_NONBLOCKING
    } else {
        AUDIO_CHUNK_SIZE_BLOCKING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vsync_off_never_blocks_video() {
        for nonblock in [false, true] {
            for force in [false, true] {
                assert!(NonblockPlan::new(nonblock, false, force, true).video);
            }
        }
    }

    #[test]
    fn test_audio_sync_off_never_blocks_audio() {
        for nonblock in [false, true] {
            assert!(NonblockPlan::new(nonblock, true, false, false).audio);
        }
    }

    #[test]
    fn test_blocking_defaults() {
        let plan = NonblockPlan::new(false, true, false, true);
        assert!(!plan.video);
        assert!(!plan.audio);
        assert_eq!(plan.chunk_size, AUDIO_CHUNK_SIZE_BLOCKING);

        let plan = NonblockPlan::new(false, true, true, true);
        assert!(plan.video);
        assert!(!plan.audio);

        assert_eq!(NonblockPlan::new(true, true, false, true).chunk_size, AUDIO_CHUNK_SIZE_NONBLOCKING);
    }
}
