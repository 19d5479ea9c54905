use super::patterns::PATTERNS;
use super::Platform;

/// A raw string paired with the platform it was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedUrl<'a> {
    /// Input with surrounding whitespace removed
    pub raw: &'a str,
    /// Recognized platform, never [`Platform::Unknown`]
    pub platform: Platform,
}

impl<'a> ClassifiedUrl<'a> {
    /// Classifies `candidate`, returning `None` when no platform matches.
    #[must_use]
    pub fn new(candidate: &'a str) -> Option<Self> {
        let raw = candidate.trim();
        if raw.is_empty() {
            return None;
        }
        PATTERNS
            .iter()
            .find(|pattern| pattern.matches_at_start(raw))
            .map(|pattern| Self {
                raw,
                platform: pattern.platform,
            })
    }
}

/// Determines which platform a string's URL shape belongs to.
///
/// Matching is case-insensitive and anchored at the start of the trimmed
/// input. Platforms are tried in registry order, so when a string could
/// satisfy more than one platform the earlier one wins. Empty and
/// non-URL input yields [`Platform::Unknown`].
///
/// # Examples
///
/// ```
/// use media_relay_core::links::{classify, Platform};
///
/// assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ"), Platform::YouTube);
/// assert_eq!(classify("not a link"), Platform::Unknown);
/// ```
#[must_use]
pub fn classify(candidate: &str) -> Platform {
    ClassifiedUrl::new(candidate).map_or(Platform::Unknown, |c| c.platform)
}

/// Returns `true` if `candidate` is an Instagram post, reel, IGTV or story link.
#[must_use]
pub fn is_instagram(candidate: &str) -> bool {
    classify(candidate) == Platform::Instagram
}

/// Returns `true` if `candidate` is a YouTube watch, short-link or shorts link.
#[must_use]
pub fn is_youtube(candidate: &str) -> bool {
    classify(candidate) == Platform::YouTube
}

/// Returns `true` if `candidate` is a TikTok video or short link.
#[must_use]
pub fn is_tiktok(candidate: &str) -> bool {
    classify(candidate) == Platform::TikTok
}

/// Returns `true` if `candidate` belongs to any supported platform.
#[must_use]
pub fn is_supported(candidate: &str) -> bool {
    classify(candidate).is_known()
}
