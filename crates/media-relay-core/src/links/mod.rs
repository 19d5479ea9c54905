//! Social media link recognition.
//!
//! Classifies free-form strings into a [`Platform`], rewrites recognized links
//! into a [`CanonicalUrl`] suitable as a cache/deduplication key, and scans
//! message text for every supported link.
//!
//! Everything here is pure and stateless: the pattern table is compiled once
//! on first use and only read afterwards, so these functions may be called
//! from any number of tasks without coordination.

mod classify;
mod extract;
mod normalize;
pub mod patterns;
pub mod route;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use classify::{classify, is_instagram, is_supported, is_tiktok, is_youtube, ClassifiedUrl};
pub use extract::extract_urls;
pub use normalize::{normalize, CanonicalUrl};
pub use route::{HelperBots, HelperRoute, RoutePlan};

/// Media source a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// instagram.com posts, reels, IGTV and stories
    Instagram,
    /// youtube.com, m.youtube.com and youtu.be
    YouTube,
    /// tiktok.com and its short-link hosts
    TikTok,
    /// Anything else
    Unknown,
}

impl Platform {
    /// Lowercase platform name as used in logs and replies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::YouTube => "youtube",
            Self::TikTok => "tiktok",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` for every platform except [`Platform::Unknown`].
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
