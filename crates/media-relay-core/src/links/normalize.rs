use super::{ClassifiedUrl, Platform};
use serde::Serialize;
use std::fmt;
use url::Url;

const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

/// A recognized link rewritten into its deduplication key form.
///
/// Canonical URLs carry no tracking parameters, fragments or trailing
/// slashes, and normalizing one again yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalUrl {
    platform: Platform,
    url: String,
}

impl CanonicalUrl {
    /// Platform the link belongs to.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// The canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Consumes the value and returns the canonical string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.url
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl PartialEq<str> for CanonicalUrl {
    fn eq(&self, other: &str) -> bool {
        self.url == other
    }
}

impl PartialEq<&str> for CanonicalUrl {
    fn eq(&self, other: &&str) -> bool {
        self.url == *other
    }
}

/// Rewrites a supported link into its canonical form.
///
/// The input is classified again first; anything that is not a supported
/// link, or that cannot be parsed (no host, malformed percent-escapes),
/// has no canonical form and yields `None`. So does a link whose path
/// collapses out of its platform's shapes once dot segments are resolved,
/// as in `https://instagram.com/p/XYZ/..`.
///
/// - YouTube: watch pages and `youtu.be` short links become
///   `https://www.youtube.com/watch?v=<id>`, any other path (shorts) becomes
///   `https://www.youtube.com<path>`.
/// - Instagram and TikTok: `<scheme>://<host><path>` with the `www.` prefix,
///   query, fragment and trailing slash removed.
///
/// # Examples
///
/// ```
/// use media_relay_core::links::normalize;
///
/// let canonical = normalize("https://youtu.be/abc123").map(|c| c.into_string());
/// assert_eq!(canonical.as_deref(), Some("https://www.youtube.com/watch?v=abc123"));
/// assert!(normalize("https://example.com").is_none());
/// ```
#[must_use]
pub fn normalize(candidate: &str) -> Option<CanonicalUrl> {
    let classified = ClassifiedUrl::new(candidate)?;
    // a URL ends at the first whitespace
    let raw = classified.raw.split_whitespace().next()?;
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    if has_malformed_escape(url.path()) {
        return None;
    }

    let canonical = match classified.platform {
        Platform::YouTube => canonical_youtube(&url, host)?,
        Platform::Instagram | Platform::TikTok => canonical_plain(&url, host),
        Platform::Unknown => return None,
    };

    // the parsed path may have lost segments the pattern relied on
    if ClassifiedUrl::new(&canonical).map(|c| c.platform) != Some(classified.platform) {
        return None;
    }

    Some(CanonicalUrl {
        platform: classified.platform,
        url: canonical,
    })
}

fn canonical_youtube(url: &Url, host: &str) -> Option<String> {
    if host == "youtu.be" || host == "www.youtu.be" {
        return watch_url(url.path().trim_matches('/'));
    }

    if url.path().eq_ignore_ascii_case("/watch") {
        if let Some(query) = url.query() {
            if has_malformed_escape(query) {
                return None;
            }
        }
        if let Some((_, id)) = url
            .query_pairs()
            .find(|(key, _)| key.eq_ignore_ascii_case("v"))
        {
            return watch_url(&id);
        }
    }

    let path = url.path().trim_end_matches('/');
    Some(format!("{YOUTUBE_ORIGIN}{path}"))
}

fn canonical_plain(url: &Url, host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let path = url.path().trim_end_matches('/');
    format!("{}://{host}{path}", url.scheme())
}

fn watch_url(id: &str) -> Option<String> {
    is_video_id(id).then(|| format!("{YOUTUBE_ORIGIN}/watch?v={id}"))
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Returns `true` if a `%` is not followed by two hex digits.
fn has_malformed_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !matches!(
                (bytes.get(i + 1), bytes.get(i + 2)),
                (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit()
            )
    })
}
