//! Validation of user-supplied parameters.

/// Validate the output format parameter.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), String> {
    match format {
        "png" | "jpeg" | "webp" => Ok(()),
        _ => Err(format!("Unsupported format '{format}'. Valid: png, jpeg, webp")),
    }
}

/// Validate the debounce window in milliseconds.
///
/// # Errors
///
/// Returns an error if the window is zero or implausibly long.
pub fn validate_debounce_ms(window_ms: u64) -> Result<(), String> {
    if (1..=60_000).contains(&window_ms) {
        Ok(())
    } else {
        Err(format!("Debounce window must be between 1 and 60000 ms, got {window_ms}"))
    }
}

/// File extension for an output format.
#[must_use]
pub fn format_extension(format: &str) -> &'static str {
    match format {
        "jpeg" => "jpg",
        "webp" => "webp",
        _ => "png",
    }
}
