//! Imgur video resolution.
//!
//! - `.gif` / `.gifv` links are rewritten to `.mp4` on the canonical host.
//! - Extensionless links are media IDs: the page is fetched and the `.mp4`
//!   is read from its `twitter:player:stream` meta tag.
//! - Links with any other extension are left to other providers.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidlink::media::{MediaResolver, Source, imgur::ImgurResolver};
//! use vidlink::{HttpClient, ResolverConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ResolverConfig::default();
//! let client = Arc::new(HttpClient::new()?);
//! let provider = ImgurResolver::new(&config.imgur, client, config.http.max_fetch_attempts);
//!
//! let video = provider.resolve(&Source::new("https://imgur.com/abc123.gifv")).await;
//! assert_eq!(video.as_deref(), Some("https://imgur.com/abc123.mp4"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{MediaResolver, Source};
use crate::config::ImgurConfig;
use crate::error::Result;
use crate::fetch::{HostAlias, PageFetcher};
use crate::http_client::{read_text, Transport};
use crate::meta::{extract_video_url, PLAYER_STREAM_META};
use crate::urls::{host_matches, last_segment, strip_suffix_ignore_case};

/// Imgur provider.
pub struct ImgurResolver {
    domain: String,
    canonical_host: String,
    max_page_bytes: u64,
    fetcher: PageFetcher,
}

impl ImgurResolver {
    pub fn new(
        config: &ImgurConfig,
        transport: Arc<dyn Transport>,
        max_fetch_attempts: usize,
    ) -> Self {
        let alias = HostAlias::new(&config.alias_host, &config.canonical_host);
        Self {
            domain: config.domain.clone(),
            canonical_host: config.canonical_host.clone(),
            max_page_bytes: config.max_page_bytes,
            fetcher: PageFetcher::new(transport, alias, max_fetch_attempts),
        }
    }

    fn parse_own_url(&self, url: &str) -> Option<Url> {
        Url::parse(url)
            .ok()
            .filter(|url| host_matches(url, &self.domain))
    }

    /// `https://<canonical>/<stem>.mp4` for a `.gifv`/`.gif` filename.
    fn rewrite_to_mp4(&self, filename: &str) -> Option<String> {
        let stem = strip_suffix_ignore_case(filename, ".gifv")
            .or_else(|| strip_suffix_ignore_case(filename, ".gif"))?;

        let mut rebuilt = Url::parse(&format!("https://{}/", self.canonical_host)).ok()?;
        rebuilt.set_path(&format!("{stem}.mp4"));
        Some(rebuilt.into())
    }

    async fn scrape_mp4(&self, url: &Url) -> Result<Option<String>> {
        let page = self.fetcher.fetch(url).await?;
        let html = read_text(page.body, self.max_page_bytes).await?;
        Ok(extract_video_url(&html, PLAYER_STREAM_META, ".mp4"))
    }
}

#[async_trait]
impl MediaResolver for ImgurResolver {
    fn name(&self) -> &'static str {
        "imgur"
    }

    fn can_handle(&self, source: &Source) -> bool {
        self.parse_own_url(&source.url).is_some()
    }

    async fn resolve(&self, source: &Source) -> Option<String> {
        let url = self.parse_own_url(&source.url)?;

        if let Some(alt_url) = source.alt_url() {
            debug!(alt_url, "Using known direct link");
            return Some(alt_url.to_string());
        }

        let filename = last_segment(&url)?;

        if let Some(mp4) = self.rewrite_to_mp4(filename) {
            return Some(mp4);
        }

        if filename.contains('.') {
            debug!(filename, "Not a gif or media ID");
            return None;
        }

        match self.scrape_mp4(&url).await {
            Ok(found) => found,
            Err(e) => {
                debug!(url = %url, error = %e, "Imgur page scrape failed");
                None
            }
        }
    }
}
