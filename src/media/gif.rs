//! Raw animated-gif detection.

use url::Url;

/// `true` if the URL looks like it points straight at a `.gif`.
///
/// Case-insensitive, query allowed (`/cat.GIF?w=300`). Anything that does
/// not parse as an absolute URL is rejected.
pub fn is_raw_gif_url(url: &str) -> bool {
    if Url::parse(url).is_err() {
        return false;
    }

    let lower = url.to_lowercase();
    lower
        .rfind('/')
        .is_some_and(|last_slash| lower[last_slash..].contains(".gif"))
}
