//! Threaded callback audio
//!
//! Wraps an audio backend for cores that produce audio from their own
//! callback instead of per-frame batches. A worker thread repeatedly pulls
//! samples from the callback and writes them to the wrapped backend. The
//! worker starts paused; [`AudioDriver::start`] lets it run.

use crate::driver::{AudioDriver, Samples};
use parking_lot::{Condvar, Mutex};
use rp_core::{AudioCallback, AudioError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Default)]
struct WorkerState {
    running: bool,
    shutdown: bool,
}

struct Shared {
    driver: Mutex<Box<dyn AudioDriver>>,
    state: Mutex<WorkerState>,
    wake: Condvar,
}

/// Audio backend driven by a worker thread
pub struct ThreadedAudio {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    use_float: bool,
}

impl ThreadedAudio {
    /// Spawn the worker around `driver`, pulling samples from `callback`.
    pub fn new(driver: Box<dyn AudioDriver>, callback: AudioCallback) -> Result<Self, AudioError> {
        let use_float = driver.use_float();
        let shared = Arc::new(Shared {
            driver: Mutex::new(driver),
            state: Mutex::new(WorkerState::default()),
            wake: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("audio-callback".to_string())
            .spawn(move || worker_loop(worker_shared, callback))
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        tracing::debug!("Threaded audio worker spawned");

        Ok(Self {
            shared,
            worker: Some(worker),
            use_float,
        })
    }

    /// Whether the worker is currently pulling audio
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    fn set_running(&self, running: bool) {
        let mut state = self.shared.state.lock();
        state.running = running;
        self.shared.wake.notify_all();
    }
}

fn worker_loop(shared: Arc<Shared>, callback: AudioCallback) {
    let mut buffer = Vec::new();

    loop {
        {
            let mut state = shared.state.lock();
            while !state.running && !state.shutdown {
                shared.wake.wait(&mut state);
            }
            if state.shutdown {
                break;
            }
        }

        buffer.clear();
        callback(&mut buffer);

        if buffer.is_empty() {
            std::thread::sleep(Duration::from_millis(1));
            continue;
        }

        if let Err(e) = shared.driver.lock().write(Samples::F32(&buffer)) {
            tracing::warn!("Threaded audio write failed: {}", e);
        }
    }

    tracing::debug!("Threaded audio worker exiting");
}

impl AudioDriver for ThreadedAudio {
    fn write(&mut self, samples: Samples<'_>) -> Result<usize, AudioError> {
        self.shared.driver.lock().write(samples)
    }

    fn start(&mut self) -> bool {
        let started = self.shared.driver.lock().start();
        self.set_running(started);
        started
    }

    fn stop(&mut self) -> bool {
        self.set_running(false);
        self.shared.driver.lock().stop()
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.shared.driver.lock().set_nonblock_state(nonblock);
    }

    fn free(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            self.shared.wake.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Threaded audio worker panicked");
            }
            self.shared.driver.lock().free();
        }
    }

    fn use_float(&self) -> bool {
        self.use_float
    }

    fn write_avail(&self) -> usize {
        self.shared.driver.lock().write_avail()
    }

    fn buffer_size(&self) -> usize {
        self.shared.driver.lock().buffer_size()
    }
}

impl Drop for ThreadedAudio {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.free();
        }
    }
}
