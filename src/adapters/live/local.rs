//! Live adapter for in-process page generation.

use std::sync::Arc;

use crate::error::PreviewError;
use crate::ports::page_generator::{GenerateFuture, PageGenerator, PageImage, PageRequest};
use crate::resource::FontGate;

/// The injected generation function: font resource + text in, encoded image
/// bytes out.
///
/// The rasterizer itself is an external collaborator (the original shipped it
/// as a wasm module); embedders hand it in at construction time.
pub type GenerateFn = dyn Fn(&str, &str) -> Result<Vec<u8>, PreviewError> + Send + Sync;

/// Renders pages by calling an embedded generation function with the loaded
/// font resource.
///
/// Unready until the font gate opens; the renderer issues no request through
/// an unready generator.
pub struct LocalGenerator {
    gate: Arc<FontGate>,
    generate: Box<GenerateFn>,
}

impl LocalGenerator {
    /// Create a local generator from a font gate and a generation function.
    #[must_use]
    pub fn new(
        gate: Arc<FontGate>,
        generate: impl Fn(&str, &str) -> Result<Vec<u8>, PreviewError> + Send + Sync + 'static,
    ) -> Self {
        Self { gate, generate: Box::new(generate) }
    }
}

impl PageGenerator for LocalGenerator {
    fn generate(&self, request: &PageRequest) -> GenerateFuture<'_> {
        let text = request.text.clone();
        Box::pin(async move {
            let font = self.gate.snapshot().ok_or_else(|| {
                PreviewError::ResourceUnavailable("font resource not loaded".into())
            })?;
            let data = (self.generate)(&font, &text)?;
            Ok(PageImage { data, mime_type: "image/png".into() })
        })
    }

    fn ready(&self) -> bool {
        self.gate.is_ready()
    }
}
