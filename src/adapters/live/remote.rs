//! Live adapter for the remote render service.

use reqwest::Client;

use crate::error::PreviewError;
use crate::ports::page_generator::{GenerateFuture, PageGenerator, PageImage, PageRequest};

/// Renders pages by posting the editor text to an HTTP render service.
///
/// The request body is the raw text; a 2xx response body is the encoded page
/// image. Always ready: the service owns its own resources.
pub struct RemoteGenerator {
    client: Client,
    url: String,
}

impl RemoteGenerator {
    /// Create a remote generator targeting the given service URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: Client::new(), url: url.into() }
    }
}

impl PageGenerator for RemoteGenerator {
    fn generate(&self, request: &PageRequest) -> GenerateFuture<'_> {
        let text = request.text.clone();
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .header("content-type", "text/plain; charset=utf-8")
                .body(text)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PreviewError::api(status.as_u16(), &body));
            }

            let mime_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map_or_else(|| "image/png".to_string(), ToString::to_string);
            let data = response.bytes().await?.to_vec();

            if data.is_empty() {
                return Err(PreviewError::Api {
                    status: status.as_u16(),
                    message: "render service returned an empty body".into(),
                });
            }

            Ok(PageImage { data, mime_type })
        })
    }
}
