//! Post link to playable video resolution.
//!
//! # Architecture
//!
//! - [`MediaResolver`]: Async trait for one source-specific strategy
//! - [`Resolver`]: Tries resolvers in priority order, first video wins
//! - [`Source`]: The post's link plus an optional known direct link
//!
//! Built-in order: imgur → gfycat lookup → gfycat transcode (raw gifs only).
//! `None` tells the caller to fall back to showing the original URL as an
//! image.
//!
//! # Example
//!
//! ```rust,no_run
//! use vidlink::{Resolver, ResolverConfig, Source};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = Resolver::from_config(&ResolverConfig::default())?;
//! let source = Source::new("https://gfycat.com/somename");
//!
//! if resolver.can_resolve(&source) {
//!     if let Some(video) = resolver.resolve(&source).await {
//!         println!("{video}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod gfycat;
pub mod gif;
pub mod imgur;
pub mod transcode;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::config::ResolverConfig;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::Result;
use crate::http_client::{HttpClient, Transport};
use crate::urls::{ends_with_ignore_case, last_segment};

/// The link to resolve, as submitted with a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// The post's primary link.
    pub url: String,
    /// A direct media link the caller already knows about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_url: Option<String>,
}

impl Source {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_url: None,
        }
    }

    #[must_use]
    pub fn with_alt_url(mut self, alt_url: impl Into<String>) -> Self {
        self.alt_url = Some(alt_url.into());
        self
    }

    /// The alternate link, treating blank as absent.
    pub fn alt_url(&self) -> Option<&str> {
        self.alt_url
            .as_deref()
            .filter(|alt| !alt.trim().is_empty())
    }
}

/// One strategy for turning a [`Source`] into a video URL.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Provider name (e.g., "imgur", "gfycat").
    fn name(&self) -> &'static str;

    /// Cheap, network-free check whether this provider applies.
    fn can_handle(&self, source: &Source) -> bool;

    /// Resolve to a video URL. Failures are absorbed and yield `None`.
    async fn resolve(&self, source: &Source) -> Option<String>;
}

/// Tries [`MediaResolver`]s in registration order.
///
/// Stateless apart from the shared transport, so one instance can serve
/// concurrent resolutions.
pub struct Resolver {
    resolvers: Vec<Box<dyn MediaResolver>>,
}

impl Resolver {
    /// Create a resolver with the built-in providers.
    pub fn new(
        config: &ResolverConfig,
        transport: Arc<dyn Transport>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let resolvers: Vec<Box<dyn MediaResolver>> = vec![
            Box::new(imgur::ImgurResolver::new(
                &config.imgur,
                transport.clone(),
                config.http.max_fetch_attempts,
            )),
            Box::new(gfycat::GfycatLookupResolver::new(
                &config.gfycat,
                transport.clone(),
                diagnostics.clone(),
            )),
            Box::new(transcode::GfycatConverter::new(
                &config.gfycat,
                transport,
                diagnostics,
            )),
        ];

        Self { resolvers }
    }

    /// Create a resolver backed by [`HttpClient`] and [`TracingDiagnostics`].
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let client = HttpClient::from_config(&config.http)?;
        Ok(Self::new(config, Arc::new(client), Arc::new(TracingDiagnostics)))
    }

    /// Create a resolver with a custom provider list, highest priority first.
    pub fn from_resolvers(resolvers: Vec<Box<dyn MediaResolver>>) -> Self {
        Self { resolvers }
    }

    /// Append a provider with the lowest priority.
    pub fn push(&mut self, resolver: Box<dyn MediaResolver>) {
        self.resolvers.push(resolver);
    }

    /// Provider names in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// `true` if any provider claims the source. Makes no network calls.
    pub fn can_resolve(&self, source: &Source) -> bool {
        self.resolvers.iter().any(|r| r.can_handle(source))
    }

    /// Resolve the source to a playable video URL.
    ///
    /// Returns `None` if no provider yields one; the caller should then
    /// show `source.url` as an image.
    #[instrument(skip(self, source), fields(url = %source.url))]
    pub async fn resolve(&self, source: &Source) -> Option<String> {
        for resolver in &self.resolvers {
            if !resolver.can_handle(source) {
                continue;
            }

            debug!("Trying media resolver: {}", resolver.name());
            let Some(candidate) = resolver.resolve(source).await else {
                continue;
            };

            if is_playable(&candidate) {
                debug!(resolver = resolver.name(), video = %candidate, "Resolved");
                return Some(candidate);
            }
            debug!(
                resolver = resolver.name(),
                candidate = %candidate,
                "Discarding candidate that is not a playable video URL"
            );
        }

        debug!("No media resolver produced a video");
        None
    }
}

/// Absolute URL that isn't a bare `.gif`.
fn is_playable(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };
    !last_segment(&url).is_some_and(|segment| ends_with_ignore_case(segment, ".gif"))
}
