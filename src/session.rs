//! The editing session: composition root for state, debouncer, and renderer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::canvas::PageCanvas;
use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE_WINDOW};
use crate::editor::EditorState;
use crate::error::PreviewError;
use crate::ports::PageGenerator;
use crate::render::{EventSlot, RenderEvent, Renderer};

/// Session construction parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period before raw input is considered stable.
    pub debounce_window: Duration,
    /// Text the session starts with; rendered immediately when non-empty.
    pub initial_text: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { debounce_window: DEFAULT_DEBOUNCE_WINDOW, initial_text: String::new() }
    }
}

/// A running book editing session.
///
/// Owns the [`EditorState`], the page canvas, and the debouncer and renderer
/// tasks. Input flows in through [`set_input`](Self::set_input); after each
/// quiet period the renderer refreshes the canvas through the generator.
///
/// Only the session's input surface mutates the raw field and only the
/// debouncer publishes the stable field; everything else observes.
pub struct EditorSession {
    state: Arc<EditorState>,
    canvas: Arc<Mutex<PageCanvas>>,
    debouncer: Debouncer,
    renderer: Renderer,
    events: EventSlot,
}

impl EditorSession {
    /// Spawn a session rendering through `generator`.
    #[must_use]
    pub fn spawn(generator: Arc<dyn PageGenerator>, config: SessionConfig) -> Self {
        let state = Arc::new(EditorState::new(config.initial_text));
        let canvas = Arc::new(Mutex::new(PageCanvas::new()));
        let events = EventSlot::default();

        let debouncer = Debouncer::attach(Arc::clone(&state), config.debounce_window);
        let renderer =
            Renderer::attach(&state, generator, Arc::clone(&canvas), events.clone());

        Self { state, canvas, debouncer, renderer, events }
    }

    /// Replace the raw input text, as the input surface does on every
    /// keystroke.
    pub fn set_input(&self, text: impl Into<String>) {
        self.state.set_raw(text);
    }

    /// Shared handle to the session state.
    #[must_use]
    pub fn state(&self) -> Arc<EditorState> {
        Arc::clone(&self.state)
    }

    /// Shared handle to the page canvas.
    #[must_use]
    pub fn canvas(&self) -> Arc<Mutex<PageCanvas>> {
        Arc::clone(&self.canvas)
    }

    /// Encode the current canvas contents as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    ///
    /// # Panics
    ///
    /// Panics if the canvas lock is poisoned.
    pub fn canvas_png(&self) -> Result<Vec<u8>, PreviewError> {
        self.canvas.lock().expect("canvas lock poisoned").to_png()
    }

    /// Sequence number of the last request drawn onto the canvas, or 0.
    ///
    /// # Panics
    ///
    /// Panics if the canvas lock is poisoned.
    #[must_use]
    pub fn last_drawn(&self) -> u64 {
        self.canvas.lock().expect("canvas lock poisoned").last_drawn()
    }

    /// Register the render-event observer, replacing any previous one.
    pub fn set_on_event(&self, callback: impl Fn(&RenderEvent) + Send + Sync + 'static) {
        self.events.set(callback);
    }

    /// Remove the render-event observer.
    pub fn clear_on_event(&self) {
        self.events.clear();
    }

    /// Wait until the pipeline has settled: the current raw value has been
    /// published (if a publish is due), the renderer has looked at every
    /// publish, and every issued request has finished.
    ///
    /// Intended for use after the caller has stopped mutating the input,
    /// e.g. before saving the canvas and exiting.
    pub async fn drain(&self) {
        let target = self.state.raw();
        if self.state.stable() != target {
            let mut stable = self.state.subscribe_stable();
            let _ = stable.wait_for(|v| *v == target).await;
        }
        let mut processed = self.renderer.subscribe_processed();
        let _ = processed.wait_for(|p| p.as_deref() == Some(target.as_str())).await;

        let issued = self.renderer.issued();
        let mut settled = self.renderer.subscribe_settled();
        let _ = settled.wait_for(|s| *s >= issued).await;
    }

    /// Tear the session down: cancel any pending debounce timer and abort
    /// in-flight render requests. No stable publish and no canvas draw can
    /// occur afterwards.
    pub fn shutdown(self) {
        self.debouncer.shutdown();
        self.renderer.shutdown();
    }
}
