//! Null audio backend
//!
//! Accepts and discards every sample. Used when no output device is wanted
//! and as the last entry of the builtin audio registry.

use crate::driver::{AudioDescriptor, AudioDriver, AudioInitParams, Samples};
use rp_core::{AudioError, Capabilities};

/// Audio backend that discards samples
#[derive(Debug)]
pub struct NullAudioBackend {
    rate: u32,
    buffer_size: usize,
    nonblock: bool,
    running: bool,
    samples_written: u64,
}

impl NullAudioBackend {
    pub fn new(params: &AudioInitParams) -> Self {
        // latency (ms) worth of stereo samples
        let buffer_size = (params.rate as usize * params.latency as usize / 1000 * 2).max(2);
        Self {
            rate: params.rate,
            buffer_size,
            nonblock: false,
            running: true,
            samples_written: 0,
        }
    }

    /// Registry entry for this backend
    pub fn descriptor() -> AudioDescriptor {
        AudioDescriptor::new(
            "null",
            Capabilities::FLOAT_AUDIO | Capabilities::BUFFER_SIZE | Capabilities::WRITE_AVAIL,
            |params| Some(Box::new(NullAudioBackend::new(params)) as Box<dyn AudioDriver>),
        )
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblock
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }
}

impl AudioDriver for NullAudioBackend {
    fn write(&mut self, samples: Samples<'_>) -> Result<usize, AudioError> {
        self.samples_written += samples.len() as u64;
        Ok(samples.len())
    }

    fn start(&mut self) -> bool {
        self.running = true;
        true
    }

    fn stop(&mut self) -> bool {
        self.running = false;
        true
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
    }

    fn free(&mut self) {
        tracing::debug!("Null audio freed after {} samples", self.samples_written);
    }

    fn use_float(&self) -> bool {
        true
    }

    fn write_avail(&self) -> usize {
        self.buffer_size
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::Descriptor;

    fn params() -> AudioInitParams {
        AudioInitParams {
            device: None,
            rate: 48000,
            latency: 64,
        }
    }

    #[test]
    fn test_null_backend() {
        let mut backend = NullAudioBackend::new(&params());
        assert_eq!(backend.write(Samples::S16(&[0; 64])).unwrap(), 64);
        assert_eq!(backend.write(Samples::F32(&[0.0; 32])).unwrap(), 32);
        assert_eq!(backend.samples_written(), 96);
        assert_eq!(backend.buffer_size(), 48000 * 64 / 1000 * 2);
        assert_eq!(backend.write_avail(), backend.buffer_size());
        backend.set_nonblock_state(true);
        assert!(backend.is_nonblocking());
        backend.free();
    }

    #[test]
    fn test_descriptor() {
        let desc = NullAudioBackend::descriptor();
        assert_eq!(desc.ident(), "null");
        assert!(desc.capabilities().contains(Capabilities::RATE_CONTROL));
        assert!(desc.init(&params()).is_some());
    }
}
