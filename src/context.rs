//! Service context that bundles the generator the session renders through.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::{LocalGenerator, RemoteGenerator};
use crate::adapters::recording::page_generator::RecordingPageGenerator;
use crate::adapters::recording::SharedRecorder;
use crate::adapters::replaying::page_generator::ReplayingPageGenerator;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::load_cassette;
use crate::config::Config;
use crate::error::PreviewError;
use crate::ports::PageGenerator;
use crate::resource::FontGate;

/// Bundles the generator behind the page-generator port.
pub struct ServiceContext {
    /// The generator the session renders through.
    pub generator: Arc<dyn PageGenerator>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext").finish_non_exhaustive()
    }
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: SharedRecorder,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk. Interactions
    /// recorded after this point are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written or the
    /// recording was already finished.
    pub fn finish(self) -> Result<std::path::PathBuf, String> {
        let recorder = self
            .recorder
            .lock()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?
            .take()
            .ok_or_else(|| "Recording already finished".to_string())?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context posting to the remote render service.
    ///
    /// # Errors
    ///
    /// Returns an error if no service URL is configured.
    pub fn live(config: &Config, service_url: Option<&str>) -> Result<Self, PreviewError> {
        let url = service_url
            .map(ToString::to_string)
            .or_else(|| config.service_url())
            .ok_or(PreviewError::MissingServiceUrl)?;
        Ok(Self { generator: Arc::new(RemoteGenerator::new(url)) })
    }

    /// Create a context that renders in-process through an embedded
    /// generation function, gated on the font resource.
    #[must_use]
    pub fn local(
        gate: Arc<FontGate>,
        generate: impl Fn(&str, &str) -> Result<Vec<u8>, PreviewError> + Send + Sync + 'static,
    ) -> Self {
        Self { generator: Arc::new(LocalGenerator::new(gate, generate)) }
    }

    /// Create a recording context that wraps the live generator with a
    /// cassette recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(
        config: &Config,
        service_url: Option<&str>,
    ) -> Result<(Self, RecordingSession), PreviewError> {
        let live = Self::live(config, service_url)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = std::path::PathBuf::from(".bookpress/cassettes")
            .join(&timestamp)
            .join("page_generator.cassette.yaml");

        let recorder: SharedRecorder = Arc::new(Mutex::new(Some(CassetteRecorder::new(
            path,
            format!("{timestamp}-page_generator"),
            get_commit_hash(),
        ))));

        let generator = RecordingPageGenerator::new(live.generator, Arc::clone(&recorder));
        Ok((Self { generator: Arc::new(generator) }, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, PreviewError> {
        let replayer = load_cassette(path)
            .map_err(|e| PreviewError::Config(format!("Failed to load cassette: {e}")))?;
        let generator = ReplayingPageGenerator::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { generator: Arc::new(generator) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
