//! Inference result types
//!
//! Shared by the CLI and the desktop app:
//! - Prediction: one detected object as reported by the hosted service
//! - ScanResult: the typed predictions plus the untouched response payload

use serde::{Deserialize, Serialize};

/// One detected object.
///
/// `x`/`y` are the box center in source-image pixels, as the service reports
/// them. Fields the service adds beyond these (`class_id`, `detection_id`, ...)
/// only live in [`ScanResult::raw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    #[serde(rename = "class", default)]
    pub class_label: String,

    #[serde(default)]
    pub confidence: f32,
}

impl Prediction {
    /// Top-left and bottom-right corners: `(x - w/2, y - h/2)`, `(x + w/2, y + h/2)`.
    pub fn corners(&self) -> ((f32, f32), (f32, f32)) {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        (
            (self.x - half_w, self.y - half_h),
            (self.x + half_w, self.y + half_h),
        )
    }
}

/// Result of one inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub predictions: Vec<Prediction>,
    /// Full response body, persisted verbatim for single-image scans
    pub raw: serde_json::Value,
}

impl ScanResult {
    pub fn count(&self) -> usize {
        self.predictions.len()
    }
}
