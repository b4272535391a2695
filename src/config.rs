//! Resolver configuration loaded from `~/.config/vidlink/config.toml`.
//!
//! Every field has a default, so the file is optional and may be partial.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub imgur: ImgurConfig,
    pub gfycat: GfycatConfig,
    pub http: HttpConfig,
}

/// Image-host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImgurConfig {
    /// Domain whose hosts (and subdomains) the imgur provider claims.
    pub domain: String,
    /// Host used when rebuilding rewritten `.mp4` links and fetching pages.
    pub canonical_host: String,
    /// Media subdomain that gets rewritten to `canonical_host` before fetching.
    pub alias_host: String,
    /// Upper bound on how much of an HTML page is read.
    pub max_page_bytes: u64,
}

impl Default for ImgurConfig {
    fn default() -> Self {
        Self {
            domain: "imgur.com".to_string(),
            canonical_host: "imgur.com".to_string(),
            alias_host: "i.imgur.com".to_string(),
            max_page_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Gfycat lookup and transcode settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GfycatConfig {
    pub domain: String,
    /// Prefix the item name is appended to.
    pub lookup_endpoint: String,
    /// Conversion endpoint; the raw gif goes into its `fetchUrl` parameter.
    pub transcode_endpoint: String,
}

impl Default for GfycatConfig {
    fn default() -> Self {
        Self {
            domain: "gfycat.com".to_string(),
            lookup_endpoint: "http://gfycat.com/cajax/get/".to_string(),
            transcode_endpoint: "https://upload.gfycat.com/transcode".to_string(),
        }
    }
}

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// Redirects followed by the HTTP client itself.
    pub max_redirects: usize,
    /// GET attempts the page fetcher makes while normalizing alias redirects.
    pub max_fetch_attempts: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("vidlink/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 10,
            timeout_secs: 30,
            max_redirects: 10,
            max_fetch_attempts: 5,
        }
    }
}

/// Load configuration from the default location.
///
/// Returns defaults if the file doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<ResolverConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(ResolverConfig::default());
    }
    load_config_from(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_config_from(path: &Path) -> Result<ResolverConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidlink")
        .join("config.toml")
}
