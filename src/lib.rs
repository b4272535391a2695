//! `vidlink` - Post link to playable video resolver
//!
//! # Features
//!
//! - **Imgur**: `.gif`/`.gifv` rewrite to `.mp4`, media-ID page scraping
//! - **Gfycat**: item lookup API
//! - **Transcode fallback**: raw `.gif` links converted through gfycat
//! - **Stateless**: one [`Resolver`] can serve concurrent resolutions
//!
//! # Example
//!
//! ```rust,no_run
//! use vidlink::{Resolver, ResolverConfig, Source};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Resolver::from_config(&ResolverConfig::default())?;
//!     match resolver.resolve(&Source::new("https://imgur.com/abc123.gifv")).await {
//!         Some(video) => println!("play {video}"),
//!         None => println!("show as image"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod media;
pub mod meta;
mod urls;

#[cfg(test)]
mod testing;

pub use config::{load_config, load_config_from, ResolverConfig};
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use error::ResolveError;
pub use fetch::{HostAlias, PageFetcher};
pub use http_client::{FetchedPage, HttpClient, Transport};
pub use media::{MediaResolver, Resolver, Source};

/// Version of vidlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
