//! Live camera capture loop
//!
//! The capture thread owns the camera from open to release. It posts
//! immutable [`CaptureEvent`]s over a channel and pokes the UI through a
//! waker; it never touches UI state. Stopping is a flag checked once per
//! iteration, so shutdown takes at most one capture plus one inference.

mod camera;

pub use camera::{list_cameras, CameraDevice, NokhwaCamera};

use crate::annotator::annotate;
use crate::config::Config;
use crate::error::{HeadcountError, Result};
use crate::gateway::{InferenceGateway, InferenceInput};
use crate::loader::fit_within;
use image::{DynamicImage, RgbImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A device handing out RGB frames.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<RgbImage>;

    /// Called exactly once, when the capture loop exits.
    fn release(&mut self);
}

/// Wakes the UI thread after an event was posted.
pub type Waker = Box<dyn Fn() + Send + 'static>;

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub model_id: String,
    pub display_bound: (u32, u32),
    pub frame_interval: Duration,
}

impl CaptureSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model_id: config.head_detection_model.clone(),
            display_bound: config.display_bound(),
            frame_interval: config.frame_interval(),
        }
    }
}

/// An annotated, display-sized frame.
#[derive(Debug, Clone)]
pub struct FrameReady {
    pub image: RgbImage,
    pub head_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    OpenFailed(String),
    ReadFailed(String),
    InferenceFailed(String),
}

impl StopReason {
    /// What to tell the user, if anything.
    pub fn error_message(&self) -> Option<String> {
        match self {
            StopReason::Requested => None,
            StopReason::OpenFailed(e) => Some(e.clone()),
            StopReason::ReadFailed(e) => Some(format!("Camera stopped: {}", e)),
            StopReason::InferenceFailed(e) => Some(format!("Live detection stopped: {}", e)),
        }
    }
}

#[derive(Debug)]
pub enum CaptureEvent {
    Frame(FrameReady),
    /// Always the last event of a capture run
    Stopped(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing,
}

struct ActiveCapture {
    running: Arc<AtomicBool>,
    events: Receiver<CaptureEvent>,
    thread: JoinHandle<()>,
}

pub struct CaptureLoop {
    settings: CaptureSettings,
    active: Option<ActiveCapture>,
    winding_down: Option<JoinHandle<()>>,
}

impl CaptureLoop {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            active: None,
            winding_down: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        if self.active.is_some() {
            CaptureState::Capturing
        } else {
            CaptureState::Idle
        }
    }

    /// Idle -> Capturing. Never blocks: the device is opened on the capture
    /// thread, after any previous capture thread has finished. An open
    /// failure comes back through [`CaptureLoop::poll`] as
    /// [`StopReason::OpenFailed`].
    pub fn start<S, O, G>(&mut self, open: O, gateway: Arc<G>, wake: Waker) -> Result<()>
    where
        S: FrameSource + 'static,
        O: FnOnce() -> Result<S> + Send + 'static,
        G: InferenceGateway + Send + Sync + 'static,
    {
        if self.active.is_some() {
            return Err(HeadcountError::Device("capture is already running".into()));
        }

        // joined on the new thread, the old one may be stuck in a request
        let previous = self.winding_down.take();

        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::channel();
        let settings = self.settings.clone();
        let flag = running.clone();

        let thread = thread::Builder::new()
            .name("capture".into())
            .spawn(move || capture_thread(previous, open, gateway, settings, flag, tx, wake))?;

        tracing::info!(model = %self.settings.model_id, "capture started");
        self.active = Some(ActiveCapture {
            running,
            events: rx,
            thread,
        });
        Ok(())
    }

    /// Capturing -> Idle. Frames still in flight are discarded.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.running.store(false, Ordering::Release);
            self.winding_down = Some(active.thread);
            tracing::info!("capture stop requested");
        }
    }

    /// Drain pending events on the UI thread. Returns to Idle once the
    /// capture thread reports that it stopped.
    pub fn poll(&mut self) -> Vec<CaptureEvent> {
        let Some(active) = &self.active else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let mut finished = false;
        loop {
            match active.events.try_recv() {
                Ok(event) => {
                    finished = matches!(event, CaptureEvent::Stopped(_));
                    events.push(event);
                    if finished {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    events.push(CaptureEvent::Stopped(StopReason::ReadFailed(
                        "capture thread exited unexpectedly".into(),
                    )));
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            if let Some(active) = self.active.take() {
                self.winding_down = Some(active.thread);
            }
        }
        events
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_thread<S, O, G>(
    previous: Option<JoinHandle<()>>,
    open: O,
    gateway: Arc<G>,
    settings: CaptureSettings,
    running: Arc<AtomicBool>,
    tx: Sender<CaptureEvent>,
    wake: Waker,
) where
    S: FrameSource,
    O: FnOnce() -> Result<S>,
    G: InferenceGateway,
{
    // the previous run may still hold the device
    if let Some(previous) = previous {
        tracing::debug!("waiting for previous capture thread");
        if previous.join().is_err() {
            tracing::error!("previous capture thread panicked");
        }
    }

    let reason = if !running.load(Ordering::Acquire) {
        StopReason::Requested
    } else {
        match open() {
            Ok(mut source) => {
                let reason = run_loop(&mut source, gateway.as_ref(), &settings, &running, &tx, &wake);
                source.release();
                reason
            }
            Err(e) => StopReason::OpenFailed(e.to_string()),
        }
    };

    match &reason {
        StopReason::Requested => tracing::info!("capture stopped"),
        other => tracing::error!(reason = ?other, "capture aborted"),
    }
    let _ = tx.send(CaptureEvent::Stopped(reason));
    wake();
}

/// The per-frame cycle: read, infer, annotate, shrink, post, pace.
pub fn run_loop<S, G>(
    source: &mut S,
    gateway: &G,
    settings: &CaptureSettings,
    running: &AtomicBool,
    tx: &Sender<CaptureEvent>,
    wake: &dyn Fn(),
) -> StopReason
where
    S: FrameSource + ?Sized,
    G: InferenceGateway + ?Sized,
{
    while running.load(Ordering::Acquire) {
        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => return StopReason::ReadFailed(e.to_string()),
        };

        let result = match gateway.infer(InferenceInput::Frame(&frame), &settings.model_id) {
            Ok(result) => result,
            Err(e) => return StopReason::InferenceFailed(e.to_string()),
        };

        let annotated = annotate(frame, &result.predictions);
        let image = fit_within(DynamicImage::ImageRgb8(annotated), settings.display_bound).into_rgb8();
        let ready = FrameReady {
            image,
            head_count: result.count(),
        };

        // receiver dropped: the UI already moved on
        if tx.send(CaptureEvent::Frame(ready)).is_err() {
            return StopReason::Requested;
        }
        wake();

        thread::sleep(settings.frame_interval);
    }
    StopReason::Requested
}
