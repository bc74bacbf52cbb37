//! Owner of all GUI state
//!
//! Widgets call into [`AppController`] and render what it exposes. The
//! capture thread only ever reaches this state through [`AppController::poll_capture`].

use std::path::Path;
use std::sync::Arc;

use headcount::Result;
use headcount::capture::{CaptureEvent, CaptureLoop, CaptureSettings, FrameSource, Waker};
use headcount::config::Config;
use headcount::gateway::{InferenceGateway, InferenceInput};
use headcount::{loader, report};
use headcount_common::{live_summary, scan_summary};

use crate::model::{AppState, ButtonStates};

pub const SELECT_PROMPT: &str = "Click 'Scan Image' to process the selected image";
pub const NO_IMAGE: &str = "No valid image selected";
pub const PROCESSING: &str = "Processing image, please wait...";
pub const SCAN_FAILED: &str = "Error processing image. Please try again.";

pub struct AppController<G> {
    config: Config,
    gateway: Arc<G>,
    capture: CaptureLoop,
    state: AppState,
    dialog: Option<String>,
}

impl<G> AppController<G>
where
    G: InferenceGateway + Send + Sync + 'static,
{
    pub fn new(config: Config, gateway: G) -> Self {
        let capture = CaptureLoop::new(CaptureSettings::from_config(&config));
        Self {
            config,
            gateway: Arc::new(gateway),
            capture,
            state: AppState::default(),
            dialog: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn buttons(&self) -> ButtonStates {
        ButtonStates::from_state(&self.state)
    }

    /// Pending error for the view to show as a modal dialog.
    pub fn take_dialog(&mut self) -> Option<String> {
        self.dialog.take()
    }

    pub fn select_image(&mut self, path: &Path) {
        if self.state.camera_active || self.state.scanning {
            tracing::debug!("image selection ignored while busy");
            return;
        }

        match loader::load_for_display(path, self.config.display_bound()) {
            Ok(image) => {
                tracing::info!(path = %path.display(), "image selected");
                self.state.image_path = Some(path.to_path_buf());
                self.state.show(image.into_rgb8());
                self.state.status = SELECT_PROMPT.to_string();
            }
            Err(e) => {
                tracing::warn!(error = %e, "image selection failed");
                self.dialog = Some(e.to_string());
            }
        }
    }

    /// First half of a scan: validate and flip the UI into its busy state.
    /// Returns whether a scan is now pending.
    pub fn request_scan(&mut self) -> bool {
        if self.state.scanning || self.state.camera_active {
            return false;
        }
        match &self.state.image_path {
            Some(path) if path.exists() => {}
            _ => {
                self.dialog = Some(NO_IMAGE.to_string());
                return false;
            }
        }

        self.state.scanning = true;
        self.state.status = PROCESSING.to_string();
        true
    }

    /// Second half of a scan. Blocks until the service answers.
    pub fn run_pending_scan(&mut self) {
        if !self.state.scanning {
            return;
        }
        let Some(path) = self.state.image_path.clone() else {
            self.state.scanning = false;
            return;
        };

        match self.scan_and_save(&path) {
            Ok(count) => {
                tracing::info!(count, "scan complete");
                self.state.status = scan_summary(count, &self.config.result_file_name());
            }
            Err(e) => {
                tracing::error!(error = %e, "scan failed");
                self.dialog = Some(format!("Failed to process image: {}", e));
                self.state.status = SCAN_FAILED.to_string();
            }
        }
        self.state.scanning = false;
    }

    pub fn scan(&mut self) {
        if self.request_scan() {
            self.run_pending_scan();
        }
    }

    fn scan_and_save(&self, path: &Path) -> Result<usize> {
        let result = self
            .gateway
            .infer(InferenceInput::Path(path), &self.config.headcount_model)?;
        report::write_scan_result(&self.config.result_file, &result.raw)?;
        Ok(result.count())
    }

    pub fn toggle_camera<S, O>(&mut self, open: O, wake: Waker)
    where
        S: FrameSource + 'static,
        O: FnOnce() -> Result<S> + Send + 'static,
    {
        if self.state.camera_active {
            self.stop_camera();
        } else {
            self.start_camera(open, wake);
        }
    }

    pub fn start_camera<S, O>(&mut self, open: O, wake: Waker)
    where
        S: FrameSource + 'static,
        O: FnOnce() -> Result<S> + Send + 'static,
    {
        if self.state.camera_active || self.state.scanning {
            return;
        }

        match self.capture.start(open, self.gateway.clone(), wake) {
            Ok(()) => {
                self.state.camera_active = true;
                self.state.clear_display();
            }
            Err(e) => {
                tracing::error!(error = %e, "camera start failed");
                self.dialog = Some(e.to_string());
            }
        }
    }

    pub fn stop_camera(&mut self) {
        if !self.state.camera_active {
            return;
        }
        self.capture.stop();
        self.leave_camera_mode();
    }

    /// Apply whatever the capture thread posted since the last call.
    pub fn poll_capture(&mut self) {
        for event in self.capture.poll() {
            match event {
                CaptureEvent::Frame(frame) => {
                    if !self.state.camera_active {
                        continue;
                    }
                    self.state.status = live_summary(frame.head_count);
                    self.state.show(frame.image);
                }
                CaptureEvent::Stopped(reason) => {
                    if let Some(message) = reason.error_message() {
                        self.dialog = Some(message);
                    }
                    self.leave_camera_mode();
                }
            }
        }
    }

    fn leave_camera_mode(&mut self) {
        self.state.camera_active = false;
        self.state.clear_display();
        self.state.status.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headcount::HeadcountError;
    use headcount_common::{ScanResult, parse_scan_result};
    use image::{Rgb, RgbImage};
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use std::time::{Duration, Instant};
    use tempfile::{TempDir, tempdir};

    /// Answers every request with `raw`, or fails when it is `None`.
    struct StubGateway {
        raw: Option<Value>,
    }

    impl InferenceGateway for StubGateway {
        fn infer(&self, _input: InferenceInput<'_>, _model_id: &str) -> Result<ScanResult> {
            match &self.raw {
                Some(raw) => Ok(parse_scan_result(raw.clone())?),
                None => Err(HeadcountError::Inference("service unavailable".into())),
            }
        }
    }

    struct StubCamera;

    impl FrameSource for StubCamera {
        fn read_frame(&mut self) -> Result<RgbImage> {
            Ok(RgbImage::from_pixel(64, 48, Rgb([30, 30, 30])))
        }

        fn release(&mut self) {}
    }

    fn response(heads: usize) -> Value {
        let predictions: Vec<Value> = (0..heads)
            .map(|i| {
                json!({
                    "x": 10.0 + 12.0 * i as f32, "y": 20.0, "width": 8.0, "height": 8.0,
                    "confidence": 0.9, "class": "person", "detection_id": format!("d{}", i)
                })
            })
            .collect();
        json!({ "time": 0.12, "image": { "width": 64, "height": 48 }, "predictions": predictions })
    }

    fn setup(raw: Option<Value>) -> (TempDir, PathBuf, AppController<StubGateway>) {
        let dir = tempdir().expect("Failed to create temp dir");
        let image_path = dir.path().join("crowd.png");
        RgbImage::from_pixel(64, 48, Rgb([120, 80, 40]))
            .save(&image_path)
            .unwrap();

        let config = Config {
            result_file: dir.path().join("inference_result.json"),
            frame_interval_ms: 1,
            ..Config::default()
        };
        (dir, image_path, AppController::new(config, StubGateway { raw }))
    }

    fn no_wake() -> Waker {
        Box::new(|| {})
    }

    fn poll_until<G>(controller: &mut AppController<G>, done: impl Fn(&AppController<G>) -> bool)
    where
        G: InferenceGateway + Send + Sync + 'static,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(controller) {
            assert!(Instant::now() < deadline, "timed out waiting for capture events");
            controller.poll_capture();
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_select_image() {
        let (_dir, image_path, mut controller) = setup(Some(response(0)));
        controller.select_image(&image_path);

        assert_eq!(controller.state().image_path.as_deref(), Some(image_path.as_path()));
        assert_eq!(controller.state().status, SELECT_PROMPT);
        let shown = controller.state().displayed.as_ref().unwrap();
        assert_eq!(shown.image.dimensions(), (64, 48));
        assert!(controller.buttons().scan_enabled);
        assert!(controller.take_dialog().is_none());
    }

    #[test]
    fn test_select_unreadable_keeps_previous() {
        let (dir, image_path, mut controller) = setup(Some(response(0)));
        controller.select_image(&image_path);

        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"definitely not an image").unwrap();
        controller.select_image(&broken);

        assert_eq!(controller.state().image_path.as_deref(), Some(image_path.as_path()));
        let message = controller.take_dialog().unwrap();
        assert!(message.starts_with("Failed to load image: "));
    }

    #[test]
    fn test_scan_without_image() {
        let (_dir, _image_path, mut controller) = setup(Some(response(0)));
        assert!(!controller.request_scan());
        assert_eq!(controller.take_dialog().as_deref(), Some(NO_IMAGE));
        assert!(!controller.state().scanning);
    }

    #[test]
    fn test_scan_deleted_image() {
        let (_dir, image_path, mut controller) = setup(Some(response(0)));
        controller.select_image(&image_path);
        std::fs::remove_file(&image_path).unwrap();

        controller.scan();
        assert_eq!(controller.take_dialog().as_deref(), Some(NO_IMAGE));
    }

    #[test]
    fn test_scan_single_person() {
        let (_dir, image_path, mut controller) = setup(Some(response(1)));
        controller.select_image(&image_path);
        controller.scan();

        let status = &controller.state().status;
        assert!(status.starts_with("Scan complete!\n\nDetected 1 person in the image."));
        assert!(status.ends_with("inference_result.json"));
    }

    #[test]
    fn test_scan_saves_raw_response() {
        let raw = response(3);
        let (_dir, image_path, mut controller) = setup(Some(raw.clone()));
        controller.select_image(&image_path);
        controller.scan();

        assert!(controller.state().status.contains("Detected 3 people"));
        let saved = report::load_scan_result(&controller.config().result_file).unwrap();
        assert_eq!(saved.raw, raw);
        assert_eq!(saved.count(), 3);
    }

    #[test]
    fn test_scan_button_during_scan() {
        let (_dir, image_path, mut controller) = setup(Some(response(2)));
        controller.select_image(&image_path);

        assert!(controller.request_scan());
        let busy = controller.buttons();
        assert!(!busy.scan_enabled);
        assert_eq!(busy.scan_label, "Scanning...");
        assert_eq!(controller.state().status, PROCESSING);
        // a second click while pending is ignored
        assert!(!controller.request_scan());

        controller.run_pending_scan();
        let done = controller.buttons();
        assert!(done.scan_enabled);
        assert_eq!(done.scan_label, "Scan Image");
    }

    #[test]
    fn test_scan_failure() {
        let (_dir, image_path, mut controller) = setup(None);
        controller.select_image(&image_path);

        assert!(controller.request_scan());
        controller.run_pending_scan();

        assert_eq!(controller.state().status, SCAN_FAILED);
        let message = controller.take_dialog().unwrap();
        assert!(message.starts_with("Failed to process image: "));
        assert!(message.contains("service unavailable"));
        assert!(controller.buttons().scan_enabled);
        assert!(!controller.config().result_file.exists());
    }

    #[test]
    fn test_camera_buttons() {
        let (_dir, image_path, mut controller) = setup(Some(response(2)));
        controller.select_image(&image_path);

        controller.toggle_camera(|| Ok(StubCamera), no_wake());
        let live = controller.buttons();
        assert!(!live.select_enabled);
        assert!(!live.scan_enabled);
        assert_eq!(live.camera_label, "Stop Camera");

        controller.toggle_camera(|| Ok(StubCamera), no_wake());
        let idle = controller.buttons();
        assert!(idle.select_enabled);
        assert!(idle.scan_enabled);
        assert_eq!(idle.camera_label, "Use Camera");
        assert!(controller.state().displayed.is_none());
    }

    #[test]
    fn test_live_frames_update_display() {
        let (_dir, _image_path, mut controller) = setup(Some(response(2)));
        controller.start_camera(|| Ok(StubCamera), no_wake());

        poll_until(&mut controller, |c| c.state().displayed.is_some());
        assert_eq!(controller.state().status, "Detected 2 heads");
        assert_eq!(
            controller.state().displayed.as_ref().unwrap().image.dimensions(),
            (64, 48)
        );

        controller.stop_camera();
        assert!(!controller.state().camera_active);
        assert!(controller.state().displayed.is_none());
    }

    #[test]
    fn test_camera_open_failure() {
        let (_dir, _image_path, mut controller) = setup(Some(response(0)));
        controller.start_camera(
            || -> Result<StubCamera> {
                Err(HeadcountError::Device("Could not open camera 0".into()))
            },
            no_wake(),
        );

        poll_until(&mut controller, |c| !c.state().camera_active);
        let message = controller.take_dialog().unwrap();
        assert!(message.contains("Could not open camera"));
        assert_eq!(controller.buttons().camera_label, "Use Camera");
    }

    #[test]
    fn test_live_inference_failure_stops_camera() {
        let (_dir, _image_path, mut controller) = setup(None);
        controller.start_camera(|| Ok(StubCamera), no_wake());

        poll_until(&mut controller, |c| !c.state().camera_active);
        let message = controller.take_dialog().unwrap();
        assert!(message.starts_with("Live detection stopped: "));
        assert!(controller.state().displayed.is_none());
    }
}
