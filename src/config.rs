//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// External endpoint configuration.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Default parameter values (used when CLI flags are at their defaults).
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// External endpoint configuration.
#[derive(Debug, Default, Deserialize)]
pub struct EndpointsConfig {
    /// Render service URL the editor posts text to.
    pub service: Option<String>,
}

/// Default parameter values from the config file.
#[derive(Debug, Deserialize)]
pub struct DefaultsConfig {
    /// Quiet period in milliseconds before input is considered stable.
    pub debounce_ms: u64,
    /// Default output format.
    pub format: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { debounce_ms: 300, format: "png".to_string() }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the render service URL, preferring the environment variable.
    #[must_use]
    pub fn service_url(&self) -> Option<String> {
        std::env::var("BOOKPRESS_SERVICE_URL").ok().or_else(|| self.endpoints.service.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `BOOKPRESS_CONFIG` environment variable
/// 3. `~/.config/bookpress/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }
    if let Ok(p) = std::env::var("BOOKPRESS_CONFIG") {
        return PathBuf::from(p);
    }
    default_config_path()
}

/// Default config path: `~/.config/bookpress/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/bookpress/config.toml")
    } else {
        PathBuf::from("bookpress.toml")
    }
}
