//! One-shot loading of the font/glyph resource that gates local rendering.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::PreviewError;

/// Readiness gate around the font/glyph resource.
///
/// The gate starts closed and opens exactly once, when a usable resource has
/// been stored. The local generator reports unready while the gate is closed,
/// so the renderer never issues a request through it.
#[derive(Debug, Default)]
pub struct FontGate {
    slot: RwLock<Option<String>>,
}

impl FontGate {
    /// Create a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a font resource has been loaded.
    ///
    /// # Panics
    ///
    /// Panics if the gate lock is poisoned.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.slot.read().expect("font gate poisoned").is_some()
    }

    /// Store the loaded resource, opening the gate.
    ///
    /// # Panics
    ///
    /// Panics if the gate lock is poisoned.
    pub fn set(&self, font: String) {
        *self.slot.write().expect("font gate poisoned") = Some(font);
    }

    /// The loaded resource, if any.
    ///
    /// # Panics
    ///
    /// Panics if the gate lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.slot.read().expect("font gate poisoned").clone()
    }
}

/// Fetch the font resource once from `url`.
///
/// The body must be non-empty, syntactically valid JSON to count as usable.
///
/// # Errors
///
/// Returns an error on transport failure, a non-2xx status, or an unusable
/// body.
pub async fn load_font(client: &reqwest::Client, url: &str) -> Result<String, PreviewError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(PreviewError::api(status.as_u16(), &body));
    }
    if body.trim().is_empty() {
        return Err(PreviewError::ResourceUnavailable("font resource is empty".into()));
    }
    serde_json::from_str::<serde_json::Value>(&body).map_err(|e| {
        PreviewError::ResourceUnavailable(format!("font resource is not valid JSON: {e}"))
    })?;

    Ok(body)
}

/// Fetch the font resource, retrying failed attempts a bounded number of
/// times with a fixed delay between them.
///
/// # Errors
///
/// Returns the last attempt's error once `attempts` have been exhausted.
pub async fn load_font_with_retry(
    client: &reqwest::Client,
    url: &str,
    attempts: u32,
    delay: Duration,
) -> Result<String, PreviewError> {
    let mut last_err =
        PreviewError::ResourceUnavailable("no load attempts were made".into());
    for attempt in 1..=attempts {
        match load_font(client, url).await {
            Ok(font) => return Ok(font),
            Err(e) => {
                log::warn!("font load attempt {attempt}/{attempts} failed: {e}");
                last_err = e;
            }
        }
        if attempt < attempts {
            tokio::time::sleep(delay).await;
        }
    }
    Err(last_err)
}

/// Spawn a background task that loads the font resource and opens `gate` on
/// success. After the retries are exhausted the gate stays closed and a
/// warning is logged; rendering through the local generator never proceeds.
pub fn spawn_font_loader(
    client: reqwest::Client,
    url: String,
    gate: Arc<FontGate>,
    attempts: u32,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match load_font_with_retry(&client, &url, attempts, delay).await {
            Ok(font) => gate.set(font),
            Err(e) => {
                log::warn!("font resource unavailable, rendering stays disabled: {e}");
            }
        }
    })
}
