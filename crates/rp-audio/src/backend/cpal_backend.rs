//! cpal audio backend
//!
//! Audio backend implementation using the cpal (Cross-Platform Audio Library).
//! Writes go into a ring buffer that the cpal callback drains. The stream
//! itself is not `Send`, so it lives on a dedicated thread that only reacts
//! to play/pause/shutdown commands.

use crate::convert::s16_to_float;
use crate::driver::{AudioDescriptor, AudioDriver, AudioInitParams, Samples};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, Stream, StreamConfig};
use crossbeam::channel::{self, Receiver, Sender};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use rp_core::{AudioError, Capabilities};
use std::thread::JoinHandle;
use std::time::Duration;

/// Smallest ring buffer, in samples
const MIN_BUFFER_SAMPLES: usize = 1024;

enum StreamCommand {
    Play,
    Pause,
    Shutdown,
}

/// cpal audio backend
pub struct CpalAudioBackend {
    producer: HeapProd<f32>,
    commands: Sender<StreamCommand>,
    worker: Option<JoinHandle<()>>,
    rate: u32,
    nonblock: bool,
    running: bool,
    scratch: Vec<f32>,
}

impl CpalAudioBackend {
    /// Open the output device and start the stream
    pub fn new(params: &AudioInitParams) -> Result<Self, AudioError> {
        let capacity = (params.rate as usize * params.latency as usize / 1000 * 2).max(MIN_BUFFER_SAMPLES);
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();

        let (cmd_tx, cmd_rx) = channel::unbounded();
        let (ready_tx, ready_rx) = channel::bounded(1);
        let device = params.device.clone();
        let rate = params.rate;

        let worker = std::thread::Builder::new()
            .name("cpal-audio".to_string())
            .spawn(move || stream_thread(device, rate, consumer, cmd_rx, ready_tx))
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(AudioError::Stream("audio thread exited early".to_string()));
            }
        }

        tracing::info!("cpal audio: {} Hz, {} sample ring buffer", rate, capacity);

        Ok(Self {
            producer,
            commands: cmd_tx,
            worker: Some(worker),
            rate,
            nonblock: false,
            running: true,
            scratch: Vec::new(),
        })
    }

    /// Registry entry for this backend
    pub fn descriptor() -> AudioDescriptor {
        AudioDescriptor::new(
            "cpal",
            Capabilities::FLOAT_AUDIO | Capabilities::BUFFER_SIZE | Capabilities::WRITE_AVAIL,
            |params| match CpalAudioBackend::new(params) {
                Ok(backend) => Some(Box::new(backend) as Box<dyn AudioDriver>),
                Err(e) => {
                    tracing::error!("Failed to open cpal audio: {}", e);
                    None
                }
            },
        )
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn send(&self, command: StreamCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

impl AudioDriver for CpalAudioBackend {
    fn write(&mut self, samples: Samples<'_>) -> Result<usize, AudioError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let data: &[f32] = match samples {
            Samples::F32(s) => s,
            Samples::S16(s) => {
                scratch.clear();
                s16_to_float(s, 1.0, &mut scratch);
                &scratch
            }
        };

        let mut written = 0;
        loop {
            written += self.producer.push_slice(&data[written..]);
            // A paused stream never drains, so blocking would never return
            if written == data.len() || self.nonblock || !self.running {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }

        self.scratch = scratch;
        Ok(written)
    }

    fn start(&mut self) -> bool {
        self.running = self.send(StreamCommand::Play);
        self.running
    }

    fn stop(&mut self) -> bool {
        self.running = false;
        self.send(StreamCommand::Pause)
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
    }

    fn free(&mut self) {
        self.running = false;
        self.send(StreamCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("cpal audio thread panicked");
            }
        }
    }

    fn use_float(&self) -> bool {
        true
    }

    fn write_avail(&self) -> usize {
        self.producer.vacant_len()
    }

    fn buffer_size(&self) -> usize {
        self.producer.capacity().get()
    }
}

impl Drop for CpalAudioBackend {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.free();
        }
    }
}

fn stream_thread(
    device: Option<String>,
    rate: u32,
    consumer: HeapCons<f32>,
    commands: Receiver<StreamCommand>,
    ready: Sender<Result<(), AudioError>>,
) {
    let stream = match open_stream(device.as_deref(), rate, consumer) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    for command in commands.iter() {
        let result = match command {
            StreamCommand::Play => stream.play(),
            StreamCommand::Pause => stream.pause(),
            StreamCommand::Shutdown => break,
        };
        if let Err(e) = result {
            tracing::error!("Audio stream control failed: {}", e);
        }
    }
}

fn open_stream(device: Option<&str>, rate: u32, mut consumer: HeapCons<f32>) -> Result<Stream, AudioError> {
    let host = cpal::default_host();
    let device = match device {
        Some(name) => host
            .output_devices()
            .map_err(|e| AudioError::Stream(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or(AudioError::NoDevice)?,
        None => host.default_output_device().ok_or(AudioError::NoDevice)?,
    };

    tracing::info!("Audio device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

    let config = StreamConfig {
        channels: 2,
        sample_rate: SampleRate(rate),
        buffer_size: BufferSize::Default,
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let read = consumer.pop_slice(data);
                data[read..].fill(0.0);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::Stream(e.to_string()))?;

    stream.play().map_err(|e| AudioError::Stream(e.to_string()))?;
    Ok(stream)
}
