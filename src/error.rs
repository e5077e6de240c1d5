//! Unified error type for bookpress.

use thiserror::Error;

/// Errors that can occur while producing a book page preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The render service returned an error response.
    #[error("Render service error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The font/glyph resource is not loaded or unusable; the render gate
    /// stays closed.
    #[error("Font resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The returned bytes could not be decoded as an image.
    #[error("Image decode error: {0}")]
    Decode(String),

    /// The local generation function failed.
    #[error("Page generation failed: {0}")]
    Generate(String),

    /// No render service URL configured.
    #[error(
        "No render service URL configured. Pass --service-url, set \
         BOOKPRESS_SERVICE_URL, or add it to the config file."
    )]
    MissingServiceUrl,
}

impl PreviewError {
    /// Build an [`PreviewError::Api`] from a status code and a response body,
    /// truncating oversized bodies.
    pub(crate) fn api(status: u16, body: &str) -> Self {
        let mut message = body.to_string();
        if message.len() > 500 {
            let mut end = 500;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
            message.push_str("...");
        }
        Self::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_short_bodies() {
        let err = PreviewError::api(502, "bad gateway");
        assert_eq!(err.to_string(), "Render service error (502): bad gateway");
    }

    #[test]
    fn api_error_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let PreviewError::Api { status, message } = PreviewError::api(500, &body) else {
            panic!("expected Api variant");
        };
        assert_eq!(status, 500);
        assert_eq!(message.len(), 503);
        assert!(message.ends_with("..."));
    }
}
