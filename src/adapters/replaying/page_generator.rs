//! Replaying adapter for the `PageGenerator` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::PreviewError;
use crate::ports::page_generator::{GenerateFuture, PageGenerator, PageImage, PageRequest};

/// Serves recorded page images from a cassette, with zero network I/O.
pub struct ReplayingPageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingPageGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl PageGenerator for ReplayingPageGenerator {
    fn generate(&self, _request: &PageRequest) -> GenerateFuture<'_> {
        let output = next_output(&self.replayer, "page_generator", "generate");
        Box::pin(async move {
            replay_result::<PageImage>(output).map_err(PreviewError::Generate)
        })
    }
}
