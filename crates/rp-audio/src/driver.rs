//! Audio driver interface
//!
//! Every audio backend implements [`AudioDriver`] and is published through an
//! [`AudioDescriptor`]. Optional operations have no-op defaults; callers
//! consult the descriptor's capabilities before relying on them.

use rp_core::{AudioError, BackendDescriptor};

/// Samples per write while audio is allowed to block
pub const AUDIO_CHUNK_SIZE_BLOCKING: usize = 512;

/// Samples per write while audio must not block
pub const AUDIO_CHUNK_SIZE_NONBLOCKING: usize = 2048;

/// Largest supported output/input rate ratio
pub const AUDIO_MAX_RATIO: usize = 16;

/// Interleaved stereo samples handed to a driver
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
    S16(&'a [i16]),
    F32(&'a [f32]),
}

impl Samples<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::S16(s) => s.len(),
            Self::F32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parameters passed to an audio driver constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInitParams {
    /// Requested device, `None` for the backend default
    pub device: Option<String>,
    /// Output sample rate in Hz
    pub rate: u32,
    /// Desired latency in milliseconds
    pub latency: u32,
}

/// Audio backend
pub trait AudioDriver: Send {
    /// Write interleaved stereo samples, returns how many were consumed.
    ///
    /// In blocking mode this waits until every sample fits into the
    /// backend's buffer.
    fn write(&mut self, samples: Samples<'_>) -> Result<usize, AudioError>;

    /// Resume playback
    fn start(&mut self) -> bool;

    /// Pause playback
    fn stop(&mut self) -> bool;

    /// Switch between blocking and non-blocking writes
    fn set_nonblock_state(&mut self, nonblock: bool);

    /// Release backend resources
    fn free(&mut self);

    /// Whether the backend prefers float samples (`FLOAT_AUDIO`)
    fn use_float(&self) -> bool {
        false
    }

    /// Free space in the backend buffer, in samples (`WRITE_AVAIL`)
    fn write_avail(&self) -> usize {
        0
    }

    /// Total backend buffer size, in samples (`BUFFER_SIZE`)
    fn buffer_size(&self) -> usize {
        0
    }
}

/// A registered audio backend
pub type AudioDescriptor = BackendDescriptor<AudioInitParams, Box<dyn AudioDriver>>;
