pub mod annotator;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod inference_model;
pub mod loader;
pub mod logging;
pub mod report;

pub use error::{HeadcountError, Result};
pub use headcount_common::{Prediction, ScanResult};
