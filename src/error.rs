use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeadcountError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("API key is not set. Export HEADCOUNT_API_KEY or run `headcount config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Camera error: {0}")]
    Device(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] headcount_common::Error),
}

pub type Result<T> = std::result::Result<T, HeadcountError>;
