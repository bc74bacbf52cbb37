//! Hosted inference service client
//!
//! One HTTP call per [`InferenceGateway::infer`]: the image is sent base64
//! encoded as a form body to `{api_url}/{model_id}?api_key=...` and the JSON
//! answer is handed back untouched next to its typed predictions.
//! No retries, no caching, no batching.

use crate::config::Config;
use crate::error::{HeadcountError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use headcount_common::{parse_scan_result, parser::has_predictions_key, ScanResult};
use image::{ImageFormat, RgbImage};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// What gets sent to the service.
#[derive(Debug, Clone, Copy)]
pub enum InferenceInput<'a> {
    /// An image file, sent byte for byte
    Path(&'a Path),
    /// A decoded camera frame, JPEG encoded before sending
    Frame(&'a RgbImage),
}

pub trait InferenceGateway {
    fn infer(&self, input: InferenceInput<'_>, model_id: &str) -> Result<ScanResult>;
}

pub struct HostedInferenceClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HostedInferenceClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        // the service decides how long an inference takes
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| HeadcountError::Inference(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self::with_http_client(client, api_url, api_key))
    }

    pub fn with_http_client(
        client: Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url.clone(), config.get_api_key()?)
    }

    pub fn endpoint(&self, model_id: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            model_id.trim_matches('/')
        )
    }
}

impl InferenceGateway for HostedInferenceClient {
    #[tracing::instrument(skip(self, input))]
    fn infer(&self, input: InferenceInput<'_>, model_id: &str) -> Result<ScanResult> {
        let payload = encode_input(input)?;
        tracing::debug!(bytes = payload.len(), "sending inference request");

        let response = self
            .client
            .post(self.endpoint(model_id))
            .query(&[("api_key", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(payload)
            .send()
            // the URL carries the API key
            .map_err(|e| HeadcountError::Inference(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(HeadcountError::Inference(format!(
                "service returned {}: {}",
                status,
                text.trim()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| HeadcountError::Inference(format!("invalid response body: {}", e.without_url())))?;

        if !has_predictions_key(&body) {
            tracing::warn!("response has no `predictions` key, counting zero detections");
        }

        let result = parse_scan_result(body)
            .map_err(|e| HeadcountError::Inference(format!("malformed response: {}", e)))?;
        tracing::debug!(count = result.count(), "inference complete");
        Ok(result)
    }
}

/// Base64 body for one request.
pub fn encode_input(input: InferenceInput<'_>) -> Result<String> {
    let bytes = match input {
        InferenceInput::Path(path) => {
            if !path.exists() {
                return Err(HeadcountError::FileNotFound(path.display().to_string()));
            }
            std::fs::read(path)?
        }
        InferenceInput::Frame(frame) => {
            let mut buffer = Cursor::new(Vec::new());
            frame
                .write_to(&mut buffer, ImageFormat::Jpeg)
                .map_err(|e| HeadcountError::Inference(format!("frame encoding failed: {}", e)))?;
            buffer.into_inner()
        }
    };
    Ok(STANDARD.encode(bytes))
}
