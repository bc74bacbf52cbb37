//! User-facing result text

/// Pick the singular form for exactly one, the plural otherwise.
pub fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Summary shown after a single-image scan.
pub fn scan_summary(count: usize, result_file: &str) -> String {
    format!(
        "Scan complete!\n\nDetected {} {} in the image.\nResults saved to: {}",
        count,
        plural(count, "person", "people"),
        result_file
    )
}

/// Status line for a live camera frame.
pub fn live_summary(count: usize) -> String {
    format!("Detected {} {}", count, plural(count, "head", "heads"))
}
