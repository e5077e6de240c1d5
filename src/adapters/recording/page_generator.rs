//! Recording adapter for the `PageGenerator` port.

use std::sync::Arc;

use super::{record_result, SharedRecorder};
use crate::ports::page_generator::{GenerateFuture, PageGenerator, PageRequest};

/// Records page generation interactions while delegating to an inner
/// generator.
pub struct RecordingPageGenerator {
    inner: Arc<dyn PageGenerator>,
    recorder: SharedRecorder,
}

impl RecordingPageGenerator {
    /// Wrap `inner` so every generate call is recorded.
    #[must_use]
    pub(crate) fn new(inner: Arc<dyn PageGenerator>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl PageGenerator for RecordingPageGenerator {
    fn generate(&self, request: &PageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.generate(&request).await;
            record_result(&recorder, "page_generator", "generate", &request, &result);
            result
        })
    }

    fn ready(&self) -> bool {
        self.inner.ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::cassette::recorder::CassetteRecorder;
    use crate::error::PreviewError;
    use crate::ports::PageImage;

    struct CannedGenerator;

    impl PageGenerator for CannedGenerator {
        fn generate(&self, request: &PageRequest) -> GenerateFuture<'_> {
            let fail = request.text == "bad";
            Box::pin(async move {
                if fail {
                    Err(PreviewError::Generate("no page".into()))
                } else {
                    Ok(PageImage { data: vec![1, 2, 3], mime_type: "image/png".into() })
                }
            })
        }
    }

    #[tokio::test]
    async fn records_both_outcomes() {
        let dir = std::env::temp_dir().join("bookpress_recording_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rec.cassette.yaml");

        let recorder: SharedRecorder =
            Arc::new(Mutex::new(Some(CassetteRecorder::new(&path, "rec", "unknown"))));
        let generator =
            RecordingPageGenerator::new(Arc::new(CannedGenerator), Arc::clone(&recorder));

        assert!(generator.generate(&PageRequest { text: "good".into() }).await.is_ok());
        assert!(generator.generate(&PageRequest { text: "bad".into() }).await.is_err());

        let written = recorder.lock().unwrap().take().unwrap().finish().unwrap();
        let content = std::fs::read_to_string(written).unwrap();
        assert!(content.contains("good"));
        assert!(content.contains("no page"));

        // The slot is empty now; further calls are served but not recorded.
        assert!(generator.generate(&PageRequest { text: "late".into() }).await.is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
