//! Scan result file
//!
//! The full service response is written as-is, indented four spaces, and
//! overwritten on every scan.

use crate::error::Result;
use headcount_common::{parse_scan_result, ScanResult};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::path::Path;

const INDENT: &[u8] = b"    ";

pub fn write_scan_result(path: &Path, raw: &Value) -> Result<()> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    raw.serialize(&mut serializer)?;
    std::fs::write(path, buffer)?;
    tracing::debug!(path = %path.display(), "scan result saved");
    Ok(())
}

pub fn load_scan_result(path: &Path) -> Result<ScanResult> {
    let content = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)?;
    Ok(parse_scan_result(raw)?)
}
