//! Headcount Common Library
//!
//! Types shared by the CLI and the desktop app: predictions returned by the
//! hosted inference service, the response parser, and summary text.

pub mod error;
pub mod parser;
pub mod summary;
pub mod types;

pub use error::{Error, Result};
pub use parser::{parse_predictions, parse_scan_result};
pub use summary::{live_summary, plural, scan_summary};
pub use types::{Prediction, ScanResult};
