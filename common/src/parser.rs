//! Inference response parser
//!
//! Turns the JSON body returned by the hosted service into a [`ScanResult`].

use crate::error::{Error, Result};
use crate::types::{Prediction, ScanResult};
use serde::Deserialize;
use serde_json::Value;

/// Extract the prediction list from a response body.
///
/// A body without a `predictions` key counts as zero detections. Whether the
/// service ever omits the key on purpose is unverified, so callers should
/// treat an empty result from such a body as an assumption.
///
/// # Examples
/// ```
/// use headcount_common::parse_predictions;
///
/// let body = serde_json::json!({ "predictions": [
///     { "x": 10.0, "y": 10.0, "width": 4.0, "height": 4.0 }
/// ]});
/// assert_eq!(parse_predictions(&body).unwrap().len(), 1);
/// assert!(parse_predictions(&serde_json::json!({})).unwrap().is_empty());
/// ```
pub fn parse_predictions(body: &Value) -> Result<Vec<Prediction>> {
    let Some(predictions) = body.get("predictions") else {
        return Ok(Vec::new());
    };

    let items = predictions
        .as_array()
        .ok_or_else(|| Error::Parse("`predictions` is not an array".into()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Prediction::deserialize(item)
                .map_err(|e| Error::Parse(format!("prediction {}: {}", index, e)))
        })
        .collect()
}

/// Parse a response body, keeping the body itself as the raw payload.
pub fn parse_scan_result(body: Value) -> Result<ScanResult> {
    let predictions = parse_predictions(&body)?;
    Ok(ScanResult {
        predictions,
        raw: body,
    })
}

/// Whether the body carries a `predictions` key at all.
pub fn has_predictions_key(body: &Value) -> bool {
    body.get("predictions").is_some()
}
