//! Routing of canonical links to the account that downloads them.
//!
//! YouTube and TikTok links are forwarded to external helper bots; Instagram
//! links are fetched by the relay account itself.

use super::{CanonicalUrl, Platform};
use std::fmt;

/// Usernames of the helper bots, without the leading `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperBots {
    /// Bot that downloads YouTube videos
    pub youtube: String,
    /// Bot that downloads TikTok videos
    pub tiktok: String,
}

/// Where a link is sent for download.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HelperRoute {
    /// Forwarded to the named helper bot
    HelperBot(String),
    /// Downloaded by the relay account
    Direct,
}

impl fmt::Display for HelperRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HelperBot(username) => write!(f, "@{username}"),
            Self::Direct => f.write_str("relay account"),
        }
    }
}

impl HelperBots {
    /// Route for links of `platform`, `None` for [`Platform::Unknown`].
    #[must_use]
    pub fn route_for(&self, platform: Platform) -> Option<HelperRoute> {
        match platform {
            Platform::YouTube => Some(HelperRoute::HelperBot(self.youtube.clone())),
            Platform::TikTok => Some(HelperRoute::HelperBot(self.tiktok.clone())),
            Platform::Instagram => Some(HelperRoute::Direct),
            Platform::Unknown => None,
        }
    }
}

/// Canonical links grouped by route, both in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePlan {
    groups: Vec<(HelperRoute, Vec<CanonicalUrl>)>,
}

impl RoutePlan {
    /// Groups `urls` by their route.
    #[must_use]
    pub fn build(urls: impl IntoIterator<Item = CanonicalUrl>, helpers: &HelperBots) -> Self {
        let mut plan = Self::default();
        for url in urls {
            let Some(route) = helpers.route_for(url.platform()) else {
                continue;
            };
            match plan.groups.iter_mut().find(|(r, _)| *r == route) {
                Some((_, bucket)) => bucket.push(url),
                None => plan.groups.push((route, vec![url])),
            }
        }
        plan
    }

    /// Route groups in first-seen order.
    #[must_use]
    pub fn groups(&self) -> &[(HelperRoute, Vec<CanonicalUrl>)] {
        &self.groups
    }

    /// Total number of routed links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, urls)| urls.len()).sum()
    }

    /// Returns `true` if no link was routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::extract_urls;

    fn helpers() -> HelperBots {
        HelperBots {
            youtube: "SaveYoutubeBot".to_string(),
            tiktok: "KeepMediaBot".to_string(),
        }
    }

    #[test]
    fn test_route_for_each_platform() {
        let helpers = helpers();
        assert_eq!(
            helpers.route_for(Platform::YouTube),
            Some(HelperRoute::HelperBot("SaveYoutubeBot".to_string()))
        );
        assert_eq!(
            helpers.route_for(Platform::TikTok),
            Some(HelperRoute::HelperBot("KeepMediaBot".to_string()))
        );
        assert_eq!(helpers.route_for(Platform::Instagram), Some(HelperRoute::Direct));
        assert_eq!(helpers.route_for(Platform::Unknown), None);
    }

    #[test]
    fn test_plan_groups_in_first_seen_order() {
        let urls = extract_urls(
            "https://vm.tiktok.com/A1 https://youtu.be/x https://instagram.com/p/P \
             https://vt.tiktok.com/B2",
        );
        let plan = RoutePlan::build(urls, &helpers());

        assert_eq!(plan.len(), 4);
        let routes: Vec<String> = plan.groups().iter().map(|(r, _)| r.to_string()).collect();
        assert_eq!(routes, vec!["@KeepMediaBot", "@SaveYoutubeBot", "relay account"]);
        assert_eq!(plan.groups()[0].1.len(), 2);
    }

    #[test]
    fn test_empty_plan() {
        let plan = RoutePlan::build(Vec::new(), &helpers());
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }
}
