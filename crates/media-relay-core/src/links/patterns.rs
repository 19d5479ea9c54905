//! Pattern registry.
//!
//! A single ordered table of `(platform, matcher)` pairs shared by the
//! classifier and the text extractor. Table order is the classification
//! priority: Instagram, then YouTube, then TikTok. Within a platform the
//! entries are alternatives and the first match wins.
//!
//! The expressions are unanchored so they can be used to search text; the
//! classifier anchors them at the start of its input itself.

// lazy_regex! statics are initialised through once_cell
#![allow(clippy::non_std_lazy_statics)]

use super::Platform;
use lazy_regex::{lazy_regex, Lazy};
use regex::Regex;

/// A compiled URL matcher and the platform it signals.
pub struct UrlPattern {
    /// Platform a match belongs to
    pub platform: Platform,
    matcher: Lazy<Regex>,
}

impl UrlPattern {
    /// The compiled expression.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.matcher
    }

    /// Returns `true` if `candidate` starts with a match of this pattern.
    #[must_use]
    pub fn matches_at_start(&self, candidate: &str) -> bool {
        // Leftmost-first search: a match at offset 0 is always the one found.
        self.matcher
            .find(candidate)
            .is_some_and(|m| m.start() == 0)
    }
}

/// Every supported URL shape in classification priority order.
pub static PATTERNS: [UrlPattern; 13] = [
    // Instagram
    UrlPattern {
        platform: Platform::Instagram,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?instagram\.com/p/[A-Za-z0-9_-]+/?(?:\?.*)?"),
    },
    UrlPattern {
        platform: Platform::Instagram,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?instagram\.com/reel/[A-Za-z0-9_-]+/?(?:\?.*)?"),
    },
    UrlPattern {
        platform: Platform::Instagram,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?instagram\.com/reels/[A-Za-z0-9_-]+/?(?:\?.*)?"),
    },
    UrlPattern {
        platform: Platform::Instagram,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?instagram\.com/tv/[A-Za-z0-9_-]+/?(?:\?.*)?"),
    },
    UrlPattern {
        platform: Platform::Instagram,
        matcher: lazy_regex!(
            r"(?i)https?://(?:www\.)?instagram\.com/stories/[A-Za-z0-9_.]+/\d+/?(?:\?.*)?"
        ),
    },
    // YouTube
    UrlPattern {
        platform: Platform::YouTube,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?youtube\.com/watch\?v=[A-Za-z0-9_-]+"),
    },
    UrlPattern {
        platform: Platform::YouTube,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?youtu\.be/[A-Za-z0-9_-]+"),
    },
    UrlPattern {
        platform: Platform::YouTube,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?youtube\.com/shorts/[A-Za-z0-9_-]+"),
    },
    UrlPattern {
        platform: Platform::YouTube,
        matcher: lazy_regex!(r"(?i)https?://m\.youtube\.com/watch\?v=[A-Za-z0-9_-]+"),
    },
    // TikTok
    UrlPattern {
        platform: Platform::TikTok,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?tiktok\.com/@[A-Za-z0-9_.]+/video/\d+"),
    },
    UrlPattern {
        platform: Platform::TikTok,
        matcher: lazy_regex!(r"(?i)https?://(?:vm|vt)\.tiktok\.com/[A-Za-z0-9]+/?"),
    },
    UrlPattern {
        platform: Platform::TikTok,
        matcher: lazy_regex!(r"(?i)https?://(?:www\.)?tiktok\.com/t/[A-Za-z0-9]+/?"),
    },
    UrlPattern {
        platform: Platform::TikTok,
        matcher: lazy_regex!(r"(?i)https?://m\.tiktok\.com/v/\d+"),
    },
];

/// Patterns belonging to one platform, in table order.
pub fn patterns_for(platform: Platform) -> impl Iterator<Item = &'static UrlPattern> {
    PATTERNS.iter().filter(move |p| p.platform == platform)
}
