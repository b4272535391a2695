//! Page fetching with alias-host normalization.
//!
//! The image host serves the same media from a canonical host and from a
//! media subdomain. The subdomain misbehaves with query strings, and a
//! request to the canonical host can be redirected back onto it, so every
//! fetch is pinned to the canonical host and re-issued if the server ends up
//! serving from the alias.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::{ResolveError, Result};
use crate::http_client::{FetchedPage, Transport};

/// Rewrite rule from an alias host to its canonical host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAlias {
    alias: String,
    canonical: String,
}

impl HostAlias {
    pub fn new(alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            canonical: canonical.into(),
        }
    }

    /// Move `url` onto the canonical host and drop its query.
    ///
    /// URLs on any other host are returned unchanged.
    pub fn normalize(&self, url: &Url) -> Url {
        let on_alias = url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.alias));
        if !on_alias {
            return url.clone();
        }

        let mut fixed = url.clone();
        if fixed.set_host(Some(&self.canonical)).is_err() {
            return url.clone();
        }
        fixed.set_query(None);
        fixed
    }
}

/// GETs pages, refetching until the served URL is stable under [`HostAlias`].
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    alias: HostAlias,
    max_attempts: usize,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn Transport>, alias: HostAlias, max_attempts: usize) -> Self {
        Self {
            transport,
            alias,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Fetch `url`, returning the first response whose final URL needs no
    /// alias rewrite.
    ///
    /// Fails with [`ResolveError::RedirectLoop`] after `max_attempts` GETs.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let mut target = self.alias.normalize(url);

        for attempt in 1..=self.max_attempts {
            let page = self.transport.get(&target).await?;
            let normalized = self.alias.normalize(&page.url);
            if normalized == page.url {
                return Ok(page);
            }

            debug!(
                attempt,
                served_from = %page.url,
                refetch = %normalized,
                "Response came from alias host"
            );
            target = normalized;
        }

        Err(ResolveError::RedirectLoop(self.max_attempts))
    }
}
