//! Error type shared by the transport, the page fetcher and the providers.
//!
//! None of these errors escape [`Resolver::resolve`](crate::Resolver::resolve):
//! providers turn them into "no resolution" at their boundary.

use thiserror::Error;

/// Failure of a single resolution step.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Alias redirects did not settle after {0} fetch attempts")]
    RedirectLoop(usize),

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
