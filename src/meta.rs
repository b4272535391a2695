//! Video URL extraction from HTML `<meta>` tags.

use scraper::{Html, Selector};
use url::Url;

use crate::urls::{ends_with_ignore_case, last_segment};

/// Meta name carrying a direct stream URL in Twitter player cards.
pub const PLAYER_STREAM_META: &str = "twitter:player:stream";

/// Return the first `<meta name="{meta_name}">` whose `content` is an
/// absolute URL with a last path segment ending in `extension`.
///
/// Tags are visited in document order. Unparseable content is skipped.
pub fn extract_video_url(html: &str, meta_name: &str, extension: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[name="{meta_name}"]"#)).ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .filter_map(|content| Url::parse(content.trim()).ok())
        .find(|url| {
            last_segment(url).is_some_and(|segment| ends_with_ignore_case(segment, extension))
        })
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_player_stream_mp4() {
        let html = r#"<html><head>
            <meta name="twitter:card" content="player">
            <meta name="twitter:player:stream" content="https://i.imgur.com/abc123.mp4">
        </head><body></body></html>"#;
        assert_eq!(
            extract_video_url(html, PLAYER_STREAM_META, ".mp4").as_deref(),
            Some("https://i.imgur.com/abc123.mp4")
        );
    }

    #[test]
    fn first_matching_tag_wins() {
        let html = r#"<head>
            <meta name="twitter:player:stream" content="https://i.imgur.com/first.webm">
            <meta name="twitter:player:stream" content="/relative/second.mp4">
            <meta name="twitter:player:stream" content="https://i.imgur.com/third.MP4">
            <meta name="twitter:player:stream" content="https://i.imgur.com/fourth.mp4">
        </head>"#;
        assert_eq!(
            extract_video_url(html, PLAYER_STREAM_META, ".mp4").as_deref(),
            Some("https://i.imgur.com/third.MP4")
        );
    }

    #[test]
    fn ignores_other_meta_names() {
        let html = r#"<meta property="og:video" content="https://i.imgur.com/abc.mp4">
            <meta name="twitter:image" content="https://i.imgur.com/abc.mp4">"#;
        assert_eq!(extract_video_url(html, PLAYER_STREAM_META, ".mp4"), None);
    }

    #[test]
    fn extension_checked_on_path_not_query() {
        let html =
            r#"<meta name="twitter:player:stream" content="https://i.imgur.com/abc.gif?as=.mp4">"#;
        assert_eq!(extract_video_url(html, PLAYER_STREAM_META, ".mp4"), None);

        let html =
            r#"<meta name="twitter:player:stream" content="https://i.imgur.com/abc.mp4?x=1">"#;
        assert_eq!(
            extract_video_url(html, PLAYER_STREAM_META, ".mp4").as_deref(),
            Some("https://i.imgur.com/abc.mp4?x=1")
        );
    }

    #[test]
    fn garbage_input_yields_none() {
        assert_eq!(extract_video_url("", PLAYER_STREAM_META, ".mp4"), None);
        assert_eq!(extract_video_url("<<<>>>", PLAYER_STREAM_META, ".mp4"), None);
        assert_eq!(extract_video_url("<meta", "bad\"name", ".mp4"), None);
    }
}
