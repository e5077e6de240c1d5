//! Editor state shared between the input surface, debouncer, and renderer.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// The two text fields of an editing session.
///
/// `raw` is mutated synchronously on every input event. `stable` is mutated
/// only by the [`Debouncer`](crate::debounce::Debouncer), at most once per
/// quiet period, so it always holds a value that `raw` held at some past
/// instant no more recently than the debounce window.
///
/// Components observe the fields through explicit [`watch`] subscriptions;
/// there is no implicit dependency tracking.
#[derive(Debug)]
pub struct EditorState {
    raw_tx: watch::Sender<String>,
    stable_tx: watch::Sender<String>,
    publishes: AtomicU64,
}

impl EditorState {
    /// Create a session state with both fields set to `initial`.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        let (raw_tx, _) = watch::channel(initial.clone());
        let (stable_tx, _) = watch::channel(initial);
        Self { raw_tx, stable_tx, publishes: AtomicU64::new(0) }
    }

    /// Replace the raw input text and notify subscribers.
    pub fn set_raw(&self, text: impl Into<String>) {
        self.raw_tx.send_replace(text.into());
    }

    /// Current raw input text.
    #[must_use]
    pub fn raw(&self) -> String {
        self.raw_tx.borrow().clone()
    }

    /// Current stable (debounced) input text.
    #[must_use]
    pub fn stable(&self) -> String {
        self.stable_tx.borrow().clone()
    }

    /// Number of stable publishes since the session started.
    #[must_use]
    pub fn publish_count(&self) -> u64 {
        self.publishes.load(Ordering::SeqCst)
    }

    /// Subscribe to raw input mutations.
    #[must_use]
    pub fn subscribe_raw(&self) -> watch::Receiver<String> {
        self.raw_tx.subscribe()
    }

    /// Subscribe to stable input publishes.
    #[must_use]
    pub fn subscribe_stable(&self) -> watch::Receiver<String> {
        self.stable_tx.subscribe()
    }

    /// Publish a stable value. Only the debouncer writes this field.
    pub(crate) fn publish_stable(&self, text: String) {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        self.stable_tx.send_replace(text);
    }
}
