//! The renderer: turns stable input values into page images on the canvas.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use crate::canvas::PageCanvas;
use crate::editor::EditorState;
use crate::ports::{PageGenerator, PageRequest};

/// Why a stable input value produced no render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The input was the empty sentinel.
    EmptyInput,
    /// The generator's resource gate is still closed.
    ResourceUnready,
}

/// Observable outcome of one stable input value flowing through the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// No request was issued.
    Skipped {
        /// Why the value was skipped.
        reason: SkipReason,
    },
    /// The request's image was drawn onto the canvas.
    Completed {
        /// Sequence number of the request.
        seq: u64,
    },
    /// The request completed after a newer one had been issued; its result
    /// was discarded. Expected flow control, not an error.
    Superseded {
        /// Sequence number of the request.
        seq: u64,
    },
    /// The request failed; the canvas keeps its prior contents.
    Failed {
        /// Sequence number of the request.
        seq: u64,
        /// Human-readable failure description.
        message: String,
    },
}

/// Single-slot observer for render events.
#[derive(Clone, Default)]
pub(crate) struct EventSlot {
    callback: Arc<Mutex<Option<Box<dyn Fn(&RenderEvent) + Send + Sync>>>>,
}

impl EventSlot {
    pub fn set(&self, callback: impl Fn(&RenderEvent) + Send + Sync + 'static) {
        *self.callback.lock().expect("event slot poisoned") = Some(Box::new(callback));
    }

    pub fn clear(&self) {
        *self.callback.lock().expect("event slot poisoned") = None;
    }

    pub fn emit(&self, event: &RenderEvent) {
        if let Some(callback) = self.callback.lock().expect("event slot poisoned").as_ref() {
            callback(event);
        }
    }
}

/// Watches the stable input and keeps the canvas showing the image for the
/// most recently issued request.
///
/// Requests are tagged with a monotonically increasing sequence number.
/// Requests may complete out of order; a completion is drawn only if no newer
/// request has been issued in the meantime, so a slow early request can never
/// overwrite a fresher image.
pub struct Renderer {
    task: JoinHandle<()>,
    issued: Arc<AtomicU64>,
    processed_rx: watch::Receiver<Option<String>>,
    settled_rx: watch::Receiver<u64>,
    inflight: Arc<Mutex<Vec<AbortHandle>>>,
}

impl Renderer {
    /// Attach a renderer to `state`, drawing through `generator` onto
    /// `canvas`. The session's initial stable value is rendered immediately,
    /// mirroring the original mount-time render.
    #[must_use]
    pub(crate) fn attach(
        state: &Arc<EditorState>,
        generator: Arc<dyn PageGenerator>,
        canvas: Arc<Mutex<PageCanvas>>,
        events: EventSlot,
    ) -> Self {
        let issued = Arc::new(AtomicU64::new(0));
        let inflight: Arc<Mutex<Vec<AbortHandle>>> = Arc::new(Mutex::new(Vec::new()));
        // Publishes coalesce under load, so settlement is tracked by the last
        // processed text rather than by counting.
        let (processed_tx, processed_rx) = watch::channel(None::<String>);
        let (settled_tx, settled_rx) = watch::channel(0u64);

        let task = {
            let issued = Arc::clone(&issued);
            let inflight = Arc::clone(&inflight);
            let mut rx = state.subscribe_stable();
            tokio::spawn(async move {
                loop {
                    let text = rx.borrow_and_update().clone();
                    if text.is_empty() {
                        events.emit(&RenderEvent::Skipped { reason: SkipReason::EmptyInput });
                    } else if !generator.ready() {
                        log::debug!("render skipped: font resource not loaded yet");
                        events.emit(&RenderEvent::Skipped { reason: SkipReason::ResourceUnready });
                    } else {
                        let seq = issued.fetch_add(1, Ordering::SeqCst) + 1;
                        let handle = tokio::spawn(execute(
                            Arc::clone(&generator),
                            text.clone(),
                            seq,
                            Arc::clone(&issued),
                            Arc::clone(&canvas),
                            events.clone(),
                            settled_tx.clone(),
                        ));
                        let mut inflight = inflight.lock().expect("inflight lock poisoned");
                        inflight.retain(|h| !h.is_finished());
                        inflight.push(handle.abort_handle());
                    }
                    processed_tx.send_replace(Some(text));
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            })
        };

        Self { task, issued, processed_rx, settled_rx, inflight }
    }

    /// Sequence number of the most recently issued request.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// The last stable value the renderer has looked at (issued or skipped),
    /// or `None` before the initial pass.
    pub(crate) fn subscribe_processed(&self) -> watch::Receiver<Option<String>> {
        self.processed_rx.clone()
    }

    /// Count of issued requests that have finished (drawn, discarded, or
    /// failed).
    pub(crate) fn subscribe_settled(&self) -> watch::Receiver<u64> {
        self.settled_rx.clone()
    }

    /// Stop watching and abort any in-flight request tasks.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.task.abort();
        for handle in self.inflight.lock().expect("inflight lock poisoned").drain(..) {
            handle.abort();
        }
    }
}

/// Run one render request to completion and settle its outcome.
async fn execute(
    generator: Arc<dyn PageGenerator>,
    text: String,
    seq: u64,
    issued: Arc<AtomicU64>,
    canvas: Arc<Mutex<PageCanvas>>,
    events: EventSlot,
    settled_tx: watch::Sender<u64>,
) {
    let request = PageRequest { text };
    let event = match generator.generate(&request).await {
        Ok(image) => {
            // The supersession check and the draw happen under the same lock
            // so a newer completion cannot interleave.
            let mut canvas = canvas.lock().expect("canvas lock poisoned");
            if seq == issued.load(Ordering::SeqCst) {
                match canvas.draw(&image) {
                    Ok(()) => {
                        canvas.mark_drawn(seq);
                        RenderEvent::Completed { seq }
                    }
                    Err(e) => RenderEvent::Failed { seq, message: e.to_string() },
                }
            } else {
                log::debug!("discarding superseded render result (seq {seq})");
                RenderEvent::Superseded { seq }
            }
        }
        Err(e) => RenderEvent::Failed { seq, message: e.to_string() },
    };
    events.emit(&event);
    settled_tx.send_modify(|n| *n += 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use image::{ImageFormat, RgbaImage};

    use crate::error::PreviewError;
    use crate::ports::{GenerateFuture, PageImage};

    fn png_bytes(r: u8, g: u8, b: u8) -> Vec<u8> {
        let mut pixels = RgbaImage::new(2, 2);
        for p in pixels.pixels_mut() {
            *p = image::Rgba([r, g, b, 255]);
        }
        let mut data = Vec::new();
        pixels.write_to(&mut Cursor::new(&mut data), ImageFormat::Png).unwrap();
        data
    }

    /// Generator whose latency and pixel color depend on the request text.
    struct FakeGenerator {
        calls: Arc<Mutex<Vec<String>>>,
        gate_open: Arc<AtomicBool>,
    }

    impl FakeGenerator {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                gate_open: Arc::new(AtomicBool::new(true)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl PageGenerator for FakeGenerator {
        fn generate(&self, request: &PageRequest) -> GenerateFuture<'_> {
            self.calls.lock().unwrap().push(request.text.clone());
            let text = request.text.clone();
            Box::pin(async move {
                match text.as_str() {
                    "slow red" => {
                        tokio::time::sleep(Duration::from_millis(150)).await;
                        Ok(PageImage { data: png_bytes(255, 0, 0), mime_type: "image/png".into() })
                    }
                    "broken" => Err(PreviewError::Generate("boom".into())),
                    _ => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok(PageImage { data: png_bytes(0, 255, 0), mime_type: "image/png".into() })
                    }
                }
            })
        }

        fn ready(&self) -> bool {
            self.gate_open.load(Ordering::SeqCst)
        }
    }

    struct Harness {
        state: Arc<EditorState>,
        canvas: Arc<Mutex<PageCanvas>>,
        generator: Arc<FakeGenerator>,
        events: Arc<Mutex<Vec<RenderEvent>>>,
        renderer: Renderer,
    }

    fn harness(initial: &str) -> Harness {
        let state = Arc::new(EditorState::new(initial));
        let canvas = Arc::new(Mutex::new(PageCanvas::new()));
        let generator = Arc::new(FakeGenerator::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let slot = EventSlot::default();
        {
            let events = Arc::clone(&events);
            slot.set(move |ev| events.lock().unwrap().push(ev.clone()));
        }
        let renderer = Renderer::attach(
            &state,
            Arc::clone(&generator) as Arc<dyn PageGenerator>,
            Arc::clone(&canvas),
            slot,
        );
        Harness { state, canvas, generator, events, renderer }
    }

    #[tokio::test]
    async fn renders_the_initial_value() {
        let h = harness("fast green");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.renderer.issued(), 1);
        assert_eq!(h.canvas.lock().unwrap().last_drawn(), 1);
        assert_eq!(h.canvas.lock().unwrap().pixel(0, 0), [0, 255, 0, 255]);
    }

    #[tokio::test]
    async fn empty_input_is_skipped() {
        let h = harness("");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.renderer.issued(), 0);
        assert_eq!(h.generator.call_count(), 0);
        assert!(h
            .events
            .lock()
            .unwrap()
            .contains(&RenderEvent::Skipped { reason: SkipReason::EmptyInput }));
    }

    #[tokio::test]
    async fn out_of_order_completion_is_discarded() {
        let h = harness("");
        tokio::time::sleep(Duration::from_millis(20)).await;

        h.state.publish_stable("slow red".into());
        tokio::time::sleep(Duration::from_millis(30)).await;
        h.state.publish_stable("fast green".into());
        tokio::time::sleep(Duration::from_millis(300)).await;

        // The fast request (seq 2) completed first and was drawn; the slow
        // request (seq 1) finished later and was discarded.
        let canvas = h.canvas.lock().unwrap();
        assert_eq!(canvas.last_drawn(), 2);
        assert_eq!(canvas.pixel(0, 0), [0, 255, 0, 255]);
        drop(canvas);

        let events = h.events.lock().unwrap();
        assert!(events.contains(&RenderEvent::Completed { seq: 2 }));
        assert!(events.contains(&RenderEvent::Superseded { seq: 1 }));
    }

    #[tokio::test]
    async fn closed_gate_issues_no_requests() {
        let h = harness("");
        h.generator.gate_open.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;

        h.state.publish_stable("fast green".into());
        h.state.publish_stable("another".into());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(h.generator.call_count(), 0);
        assert_eq!(h.renderer.issued(), 0);
        assert!(h
            .events
            .lock()
            .unwrap()
            .contains(&RenderEvent::Skipped { reason: SkipReason::ResourceUnready }));

        // Once the gate opens the next stable value renders normally.
        h.generator.gate_open.store(true, Ordering::SeqCst);
        h.state.publish_stable("fast green".into());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.generator.call_count(), 1);
        assert_eq!(h.canvas.lock().unwrap().last_drawn(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_prior_canvas_contents() {
        let h = harness("fast green");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.canvas.lock().unwrap().pixel(0, 0), [0, 255, 0, 255]);

        h.state.publish_stable("broken".into());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(h.canvas.lock().unwrap().pixel(0, 0), [0, 255, 0, 255]);
        let events = h.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|ev| matches!(ev, RenderEvent::Failed { seq: 2, .. })));
    }

    #[tokio::test]
    async fn shutdown_aborts_in_flight_requests() {
        let h = harness("");
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.state.publish_stable("slow red".into());
        tokio::time::sleep(Duration::from_millis(30)).await;

        h.renderer.shutdown();
        tokio::time::sleep(Duration::from_millis(300)).await;

        // The aborted request never drew.
        assert_eq!(h.canvas.lock().unwrap().last_drawn(), 0);
    }
}
