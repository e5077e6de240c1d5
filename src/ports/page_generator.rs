//! Page generator port: the external book-image collaborator.
//!
//! The text-formatting grammar and the rasterization itself live behind this
//! boundary; the editor core only hands over text and receives encoded image
//! bytes.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::PreviewError;

/// A request for one rendered book page.
///
/// Carries no identity beyond its text value; a request superseded by a newer
/// one is simply discarded by the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// The full editor text, formatting codes included.
    pub text: String,
}

/// One rendered book page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageImage {
    /// Encoded image bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
}

/// Boxed future type returned by [`PageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<PageImage, PreviewError>> + Send + 'a>>;

/// Produces a book page image for a piece of editor text.
pub trait PageGenerator: Send + Sync {
    /// Generate a page image for the given request.
    fn generate(&self, request: &PageRequest) -> GenerateFuture<'_>;

    /// Whether the generator can currently serve requests.
    ///
    /// The local variant reports `false` until its font resource has loaded;
    /// the renderer issues no request while a generator is unready.
    fn ready(&self) -> bool {
        true
    }
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as a base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize a base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
