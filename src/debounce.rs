//! Quiet-period debouncing of raw input mutations.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::editor::EditorState;

/// Default quiet period before input is considered stable.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Converts the high-frequency stream of raw mutations into a low-frequency
/// stream of stable publishes.
///
/// Every raw mutation cancels the pending quiet-period timer and starts a new
/// one; when a timer elapses uncancelled, the current raw value is published
/// into the stable field. Dropping (or shutting down) the debouncer cancels
/// any pending timer, so no publish can occur after teardown.
#[derive(Debug)]
pub struct Debouncer {
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Attach a debouncer to `state` with the given quiet period.
    #[must_use]
    pub fn attach(state: Arc<EditorState>, window: Duration) -> Self {
        let mut rx = state.subscribe_raw();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                // A mutation arrived; keep restarting the timer until the
                // input stays quiet for a full window.
                loop {
                    let timer = tokio::time::sleep(window);
                    tokio::pin!(timer);
                    tokio::select! {
                        res = rx.changed() => {
                            if res.is_err() {
                                return;
                            }
                        }
                        () = &mut timer => {
                            let value = rx.borrow().clone();
                            state.publish_stable(value);
                            break;
                        }
                    }
                }
            }
        });
        Self { task }
    }

    /// Cancel any pending publish and stop the debouncer.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    async fn settle() {
        tokio::time::sleep(WINDOW * 3).await;
    }

    #[tokio::test]
    async fn burst_publishes_once_with_last_value() {
        let state = Arc::new(EditorState::new(""));
        let _debouncer = Debouncer::attach(Arc::clone(&state), WINDOW);

        for text in ["H", "He", "Hel", "Hell", "Hello"] {
            state.set_raw(text);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        settle().await;

        assert_eq!(state.publish_count(), 1);
        assert_eq!(state.stable(), "Hello");
    }

    #[tokio::test]
    async fn spaced_mutations_publish_each() {
        let state = Arc::new(EditorState::new(""));
        let _debouncer = Debouncer::attach(Arc::clone(&state), WINDOW);

        state.set_raw("first");
        settle().await;
        state.set_raw("second");
        settle().await;

        assert_eq!(state.publish_count(), 2);
        assert_eq!(state.stable(), "second");
    }

    #[tokio::test]
    async fn teardown_cancels_pending_publish() {
        let state = Arc::new(EditorState::new(""));
        let debouncer = Debouncer::attach(Arc::clone(&state), WINDOW);

        state.set_raw("never published");
        debouncer.shutdown();
        settle().await;

        assert_eq!(state.publish_count(), 0);
        assert_eq!(state.stable(), "");
    }

    #[tokio::test]
    async fn drop_also_cancels_pending_publish() {
        let state = Arc::new(EditorState::new(""));
        {
            let _debouncer = Debouncer::attach(Arc::clone(&state), WINDOW);
            state.set_raw("gone");
        }
        settle().await;

        assert_eq!(state.publish_count(), 0);
    }
}
