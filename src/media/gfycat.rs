//! Gfycat video resolution via the item lookup API.
//!
//! `https://gfycat.com/<name>` is looked up at `<lookup_endpoint><name>`,
//! which answers `{ "gfyItem": { "mp4Url": "..." } }`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{MediaResolver, Source};
use crate::config::GfycatConfig;
use crate::diagnostics::{Diagnostics, GFYCAT_LOOKUP_FAILED};
use crate::error::{ResolveError, Result};
use crate::http_client::{read_json, Transport};
use crate::urls::{host_matches, last_segment};

/// Gfycat lookup provider.
pub struct GfycatLookupResolver {
    domain: String,
    lookup_endpoint: String,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl GfycatLookupResolver {
    pub fn new(
        config: &GfycatConfig,
        transport: Arc<dyn Transport>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            domain: config.domain.clone(),
            lookup_endpoint: config.lookup_endpoint.clone(),
            transport,
            diagnostics,
        }
    }

    /// Lookup API URL for a gfycat post, or `None` if the post isn't one.
    pub fn build_api_url(&self, post_url: &str) -> Option<String> {
        let url = Url::parse(post_url).ok()?;
        if !host_matches(&url, &self.domain) {
            return None;
        }
        let name = last_segment(&url)?;
        Some(format!("{}{name}", self.lookup_endpoint))
    }

    /// Query the lookup API.
    ///
    /// Failures (including a missing or blank `mp4Url`) are reported to
    /// diagnostics and yield `None`. An empty `api_url` makes no request.
    pub async fn lookup(&self, api_url: &str) -> Option<String> {
        if api_url.is_empty() {
            return None;
        }

        match self.fetch_mp4_url(api_url).await {
            Ok(mp4_url) => Some(mp4_url),
            Err(e) => {
                self.diagnostics.report_unexpected_event(GFYCAT_LOOKUP_FAILED, &e);
                None
            }
        }
    }

    async fn fetch_mp4_url(&self, api_url: &str) -> Result<String> {
        let url = Url::parse(api_url)?;
        tracing::debug!("Fetching from gfycat lookup: {}", url);

        let page = self.transport.get(&url).await?;
        let response: LookupResponse = read_json(page.body).await?;

        response
            .gfy_item
            .and_then(|item| item.mp4_url)
            .filter(|mp4_url| !mp4_url.trim().is_empty())
            .ok_or(ResolveError::MissingField("gfyItem.mp4Url"))
    }
}

#[async_trait]
impl MediaResolver for GfycatLookupResolver {
    fn name(&self) -> &'static str {
        "gfycat"
    }

    fn can_handle(&self, source: &Source) -> bool {
        self.build_api_url(&source.url).is_some()
    }

    async fn resolve(&self, source: &Source) -> Option<String> {
        let api_url = self.build_api_url(&source.url)?;
        self.lookup(&api_url).await
    }
}

// ============================================================================
// Gfycat API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(rename = "gfyItem")]
    gfy_item: Option<GfyItem>,
}

#[derive(Debug, Deserialize)]
struct GfyItem {
    #[serde(rename = "mp4Url")]
    mp4_url: Option<String>,
}
