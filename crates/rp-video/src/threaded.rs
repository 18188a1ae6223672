//! Threaded video
//!
//! Runs a video backend on its own thread. The backend is constructed on
//! the worker, frames are copied and handed over through a single-slot
//! channel (a newer frame is dropped while the worker is still busy with
//! the previous one) and control calls are forwarded as commands.

use crate::driver::{VideoDescriptor, VideoDriver, VideoFrame, VideoInfo, VideoInit, Viewport};
use crossbeam::channel::{self, select, Receiver, Sender, TrySendError};
use rp_core::{PixelFormat, VideoError};
use rp_input::SharedInput;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

struct OwnedFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    pitch: usize,
    format: PixelFormat,
}

impl OwnedFrame {
    fn copy_of(frame: &VideoFrame<'_>) -> Self {
        Self {
            data: frame.data.to_vec(),
            width: frame.width,
            height: frame.height,
            pitch: frame.pitch,
            format: frame.format,
        }
    }

    fn as_frame(&self) -> VideoFrame<'_> {
        VideoFrame::new(&self.data, self.width, self.height, self.pitch, self.format)
    }
}

struct FramePacket {
    frame: Option<OwnedFrame>,
    msg: Option<String>,
}

enum Command {
    SetNonblock(bool),
    SetRotation(u32),
    SetShader(Option<PathBuf>, Sender<bool>),
    Alive(Sender<bool>),
    Focus(Sender<bool>),
    Viewport(Sender<Option<Viewport>>),
    Free,
}

/// Video backend running on a worker thread
pub struct ThreadedVideo {
    commands: Sender<Command>,
    frames: Sender<FramePacket>,
    errors: Receiver<VideoError>,
    worker: Option<JoinHandle<()>>,
    dropped_frames: u64,
}

impl ThreadedVideo {
    /// Construct the backend described by `descriptor` on a new worker thread.
    pub fn spawn(descriptor: VideoDescriptor, info: VideoInfo) -> Result<VideoInit, VideoError> {
        let (cmd_tx, cmd_rx) = channel::unbounded();
        let (frame_tx, frame_rx) = channel::bounded(1);
        let (err_tx, err_rx) = channel::unbounded();
        let (ready_tx, ready_rx) = channel::bounded::<Option<(Option<SharedInput>, bool)>>(1);

        let worker = std::thread::Builder::new()
            .name("video".to_string())
            .spawn(move || {
                let Some(init) = descriptor.init(&info) else {
                    let _ = ready_tx.send(None);
                    return;
                };
                let VideoInit {
                    driver,
                    input,
                    context_cache_ack,
                } = init;
                let _ = ready_tx.send(Some((input, context_cache_ack)));
                worker_loop(driver, cmd_rx, frame_rx, err_tx);
            })
            .map_err(|_| VideoError::WorkerGone)?;

        match ready_rx.recv() {
            Ok(Some((input, context_cache_ack))) => {
                tracing::info!("Threaded video started");
                let threaded = Self {
                    commands: cmd_tx,
                    frames: frame_tx,
                    errors: err_rx,
                    worker: Some(worker),
                    dropped_frames: 0,
                };
                Ok(VideoInit {
                    driver: Box::new(threaded),
                    input,
                    context_cache_ack,
                })
            }
            _ => {
                let _ = worker.join();
                Err(VideoError::WorkerGone)
            }
        }
    }

    /// Frames dropped because the worker was still busy
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    fn query<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> Option<T> {
        let (tx, rx) = channel::bounded(1);
        self.commands.send(make(tx)).ok()?;
        rx.recv().ok()
    }
}

fn worker_loop(
    mut driver: Box<dyn VideoDriver>,
    commands: Receiver<Command>,
    frames: Receiver<FramePacket>,
    errors: Sender<VideoError>,
) {
    loop {
        let keep_running = select! {
            recv(commands) -> command => match command {
                Ok(command) => handle_command(driver.as_mut(), command),
                Err(_) => false,
            },
            recv(frames) -> packet => match packet {
                Ok(packet) => {
                    let frame = packet.frame.as_ref().map(OwnedFrame::as_frame);
                    if let Err(e) = driver.frame(frame.as_ref(), packet.msg.as_deref()) {
                        let _ = errors.send(e);
                    }
                    true
                }
                Err(_) => false,
            },
        };
        if !keep_running {
            break;
        }
    }

    driver.free();
    tracing::debug!("Video worker exiting");
}

/// Apply one control command, `false` once the worker should exit.
fn handle_command(driver: &mut dyn VideoDriver, command: Command) -> bool {
    match command {
        Command::SetNonblock(nonblock) => driver.set_nonblock_state(nonblock),
        Command::SetRotation(rotation) => driver.set_rotation(rotation),
        Command::SetShader(path, reply) => {
            let _ = reply.send(driver.set_shader(path.as_deref()));
        }
        Command::Alive(reply) => {
            let _ = reply.send(driver.alive());
        }
        Command::Focus(reply) => {
            let _ = reply.send(driver.focus());
        }
        Command::Viewport(reply) => {
            let _ = reply.send(driver.viewport_info());
        }
        Command::Free => return false,
    }
    true
}

impl VideoDriver for ThreadedVideo {
    fn frame(&mut self, frame: Option<&VideoFrame<'_>>, msg: Option<&str>) -> Result<(), VideoError> {
        if let Ok(e) = self.errors.try_recv() {
            return Err(e);
        }

        let packet = FramePacket {
            frame: frame.map(OwnedFrame::copy_of),
            msg: msg.map(str::to_string),
        };
        match self.frames.try_send(packet) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped_frames += 1;
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(VideoError::WorkerGone),
        }
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        let _ = self.commands.send(Command::SetNonblock(nonblock));
    }

    fn alive(&mut self) -> bool {
        self.query(Command::Alive).unwrap_or(false)
    }

    fn focus(&self) -> bool {
        self.query(Command::Focus).unwrap_or(false)
    }

    fn free(&mut self) {
        let _ = self.commands.send(Command::Free);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Video worker panicked");
            }
        }
        if self.dropped_frames > 0 {
            tracing::info!("Threaded video dropped {} frames", self.dropped_frames);
        }
    }

    fn set_shader(&mut self, path: Option<&Path>) -> bool {
        let path = path.map(Path::to_path_buf);
        self.query(|reply| Command::SetShader(path, reply)).unwrap_or(false)
    }

    fn set_rotation(&mut self, rotation: u32) {
        let _ = self.commands.send(Command::SetRotation(rotation));
    }

    fn viewport_info(&self) -> Option<Viewport> {
        self.query(Command::Viewport).flatten()
    }
}

impl Drop for ThreadedVideo {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.free();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullVideoBackend;
    use rp_core::{Capabilities, Descriptor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        frames: Arc<AtomicUsize>,
        freed: Arc<AtomicUsize>,
    }

    impl VideoDriver for Counting {
        fn frame(&mut self, frame: Option<&VideoFrame<'_>>, _msg: Option<&str>) -> Result<(), VideoError> {
            if frame.is_some() {
                self.frames.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
        fn set_nonblock_state(&mut self, _nonblock: bool) {}
        fn alive(&mut self) -> bool {
            true
        }
        fn focus(&self) -> bool {
            true
        }
        fn free(&mut self) {
            self.freed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_spawn_and_free() {
        let frames = Arc::new(AtomicUsize::new(0));
        let freed = Arc::new(AtomicUsize::new(0));
        let (f, d) = (Arc::clone(&frames), Arc::clone(&freed));
        let desc = VideoDescriptor::new("counting", Capabilities::empty(), move |_| {
            Some(VideoInit::new(Box::new(Counting {
                frames: Arc::clone(&f),
                freed: Arc::clone(&d),
            })))
        });
        assert_eq!(desc.ident(), "counting");

        let mut init = ThreadedVideo::spawn(desc, VideoInfo::default()).unwrap();
        assert!(init.driver.alive());

        let data = [0u8; 8];
        let frame = VideoFrame::new(&data, 2, 2, 4, PixelFormat::Rgb565);
        init.driver.frame(Some(&frame), None).unwrap();
        // Queries are processed after the worker is idle again
        assert!(init.driver.focus());

        init.driver.free();
        assert_eq!(freed.load(Ordering::SeqCst), 1);
        assert!(frames.load(Ordering::SeqCst) <= 1);
    }

    #[test]
    fn test_failed_init_reports_worker_gone() {
        let desc = VideoDescriptor::new("broken", Capabilities::empty(), |_| None);
        assert!(matches!(
            ThreadedVideo::spawn(desc, VideoInfo::default()),
            Err(VideoError::WorkerGone)
        ));
    }

    #[test]
    fn test_queries_reach_backend() {
        let mut init = ThreadedVideo::spawn(NullVideoBackend::descriptor(), VideoInfo::default()).unwrap();
        let vp = init.driver.viewport_info().unwrap();
        assert_eq!((vp.width, vp.height), (640, 480));
        assert!(init.driver.set_shader(None));
        init.driver.free();
    }
}
