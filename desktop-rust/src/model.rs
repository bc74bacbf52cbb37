use image::RgbImage;
use std::path::PathBuf;

/// Image currently on screen. `revision` changes whenever the pixels do.
#[derive(Debug, Clone)]
pub struct DisplayImage {
    pub image: RgbImage,
    pub revision: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub image_path: Option<PathBuf>,
    pub camera_active: bool,
    pub displayed: Option<DisplayImage>,
    pub scanning: bool,
    pub status: String,
    revision: u64,
}

impl AppState {
    pub fn show(&mut self, image: RgbImage) {
        self.revision += 1;
        self.displayed = Some(DisplayImage {
            image,
            revision: self.revision,
        });
    }

    pub fn clear_display(&mut self) {
        self.displayed = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonStates {
    pub select_enabled: bool,
    pub scan_enabled: bool,
    pub scan_label: &'static str,
    pub camera_enabled: bool,
    pub camera_label: &'static str,
}

impl ButtonStates {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            select_enabled: !state.camera_active && !state.scanning,
            scan_enabled: state.image_path.is_some() && !state.camera_active && !state.scanning,
            scan_label: if state.scanning { "Scanning..." } else { "Scan Image" },
            camera_enabled: !state.scanning,
            camera_label: if state.camera_active { "Stop Camera" } else { "Use Camera" },
        }
    }
}
