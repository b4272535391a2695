//! Small URL helpers shared by the providers.

use url::Url;

/// Last non-empty path segment, or `None` for a root path.
pub fn last_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.rev().find(|s| !s.is_empty())
}

/// `true` if `host` is `domain` or a subdomain of it, ignoring case.
pub fn host_matches(url: &Url, domain: &str) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();

    host == domain
        || host
            .strip_suffix(&domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Strip `suffix` from the end of `s`, comparing ASCII case-insensitively.
pub fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// `true` if `s` ends with `suffix`, ignoring ASCII case.
pub fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    strip_suffix_ignore_case(s, suffix).is_some()
}
