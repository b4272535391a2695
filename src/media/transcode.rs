//! Fallback: have gfycat transcode a raw `.gif` into a video.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::gif::is_raw_gif_url;
use super::{MediaResolver, Source};
use crate::config::GfycatConfig;
use crate::diagnostics::{Diagnostics, GFYCAT_CONVERT_FAILED};
use crate::error::{ResolveError, Result};
use crate::http_client::{read_json, Transport};

/// Gfycat transcode provider. Handles any URL that looks like a raw gif.
pub struct GfycatConverter {
    endpoint: String,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl GfycatConverter {
    pub fn new(
        config: &GfycatConfig,
        transport: Arc<dyn Transport>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            endpoint: config.transcode_endpoint.clone(),
            transport,
            diagnostics,
        }
    }

    /// Transcode request URL with `raw_gif_url` in the `fetchUrl` parameter.
    pub fn build_convert_url(&self, raw_gif_url: &str) -> Result<Url> {
        Ok(Url::parse_with_params(&self.endpoint, &[("fetchUrl", raw_gif_url)])?)
    }

    /// Ask the transcode endpoint for a video of `raw_gif_url`.
    ///
    /// Failures are reported to diagnostics and yield `None`.
    pub async fn convert(&self, raw_gif_url: &str) -> Option<String> {
        if raw_gif_url.is_empty() {
            return None;
        }

        match self.fetch_mp4_url(raw_gif_url).await {
            Ok(mp4_url) => Some(mp4_url),
            Err(e) => {
                self.diagnostics.report_unexpected_event(GFYCAT_CONVERT_FAILED, &e);
                None
            }
        }
    }

    async fn fetch_mp4_url(&self, raw_gif_url: &str) -> Result<String> {
        let url = self.build_convert_url(raw_gif_url)?;
        tracing::debug!("Requesting gfycat transcode: {}", url);

        let page = self.transport.get(&url).await?;
        let response: TranscodeResponse = read_json(page.body).await?;

        response
            .mp4_url
            .filter(|mp4_url| !mp4_url.trim().is_empty())
            .ok_or(ResolveError::MissingField("mp4Url"))
    }
}

#[async_trait]
impl MediaResolver for GfycatConverter {
    fn name(&self) -> &'static str {
        "gfycat-transcode"
    }

    fn can_handle(&self, source: &Source) -> bool {
        is_raw_gif_url(&source.url)
    }

    async fn resolve(&self, source: &Source) -> Option<String> {
        if !self.can_handle(source) {
            return None;
        }
        self.convert(&source.url).await
    }
}

#[derive(Debug, Deserialize)]
struct TranscodeResponse {
    #[serde(rename = "mp4Url")]
    mp4_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingDiagnostics, ScriptedTransport};

    const ENDPOINT: &str = "https://upload.gfycat.com/transcode";

    fn converter(
        transport: &Arc<ScriptedTransport>,
        diagnostics: &Arc<RecordingDiagnostics>,
    ) -> GfycatConverter {
        GfycatConverter::new(&GfycatConfig::default(), transport.clone(), diagnostics.clone())
    }

    #[test]
    fn convert_url_encodes_fetch_url() {
        let transport = Arc::new(ScriptedTransport::new());
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let url = converter(&transport, &diagnostics)
            .build_convert_url("https://example.com/cat.gif?a=1&b=2")
            .unwrap();

        assert_eq!(url.path(), "/transcode");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("fetchUrl".to_string(), "https://example.com/cat.gif?a=1&b=2".to_string())]
        );
    }

    #[tokio::test]
    async fn converts_raw_gif() {
        let transport = Arc::new(ScriptedTransport::new().page(
            ENDPOINT,
            r#"{"gfyname":"converted","mp4Url":"https://giant.gfycat.com/converted.mp4"}"#,
        ));
        let diagnostics = Arc::new(RecordingDiagnostics::default());

        let video = converter(&transport, &diagnostics)
            .resolve(&Source::new("https://example.com/cat.gif"))
            .await;
        assert_eq!(video.as_deref(), Some("https://giant.gfycat.com/converted.mp4"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("https://upload.gfycat.com/transcode?fetchUrl="));
    }

    #[tokio::test]
    async fn skips_non_gif_sources() {
        let transport = Arc::new(ScriptedTransport::new());
        let diagnostics = Arc::new(RecordingDiagnostics::default());

        let video = converter(&transport, &diagnostics)
            .resolve(&Source::new("https://example.com/page.html"))
            .await;
        assert_eq!(video, None);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let diagnostics = Arc::new(RecordingDiagnostics::default());

        assert_eq!(converter(&transport, &diagnostics).convert("").await, None);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_mp4_url_is_reported() {
        let transport = Arc::new(
            ScriptedTransport::new().page(ENDPOINT, r#"{"isOk":false,"error":"too large"}"#),
        );
        let diagnostics = Arc::new(RecordingDiagnostics::default());

        let video = converter(&transport, &diagnostics)
            .convert("https://example.com/huge.gif")
            .await;
        assert_eq!(video, None);
        assert_eq!(diagnostics.events(), vec![GFYCAT_CONVERT_FAILED]);
    }

    #[tokio::test]
    async fn http_failure_is_reported() {
        let transport = Arc::new(ScriptedTransport::new().status(ENDPOINT, 502));
        let diagnostics = Arc::new(RecordingDiagnostics::default());

        let video = converter(&transport, &diagnostics)
            .convert("https://example.com/cat.gif")
            .await;
        assert_eq!(video, None);
        assert_eq!(diagnostics.events(), vec![GFYCAT_CONVERT_FAILED]);
    }
}
