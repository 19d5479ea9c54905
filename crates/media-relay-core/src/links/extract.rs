use super::patterns::PATTERNS;
use super::{normalize, CanonicalUrl};
use std::collections::HashSet;

/// Finds every supported link in `text` and returns their canonical forms.
///
/// All registry patterns are searched (not anchored) across the whole text.
/// Raw matches are visited in the order they appear in the text, ties broken
/// by registry order; each is normalized, matches without a canonical form
/// are skipped, and duplicates are dropped keeping the first occurrence.
///
/// # Examples
///
/// ```
/// use media_relay_core::links::extract_urls;
///
/// let text = "look https://youtu.be/abc and https://www.youtube.com/watch?v=abc&t=1";
/// let urls = extract_urls(text);
/// assert_eq!(urls.len(), 1);
/// assert_eq!(urls[0].as_str(), "https://www.youtube.com/watch?v=abc");
/// ```
#[must_use]
pub fn extract_urls(text: &str) -> Vec<CanonicalUrl> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut raw_matches: Vec<(usize, usize, &str)> = PATTERNS
        .iter()
        .enumerate()
        .flat_map(|(rank, pattern)| {
            pattern
                .regex()
                .find_iter(text)
                .map(move |m| (m.start(), rank, m.as_str()))
        })
        .collect();
    raw_matches.sort_by_key(|&(start, rank, _)| (start, rank));

    let mut seen = HashSet::new();
    raw_matches
        .into_iter()
        .filter_map(|(_, _, raw)| normalize(raw))
        .filter(|canonical| seen.insert(canonical.as_str().to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::Platform;

    fn extract(text: &str) -> Vec<String> {
        extract_urls(text)
            .into_iter()
            .map(CanonicalUrl::into_string)
            .collect()
    }

    #[test]
    fn test_empty_and_plain_text() {
        assert!(extract("").is_empty());
        assert!(extract("   \n\t").is_empty());
        assert!(extract("nothing to see here, https://example.com").is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let text = "first https://www.youtube.com/watch?v=abc123&feature=share \
                    again https://youtu.be/abc123?si=track \
                    and https://www.instagram.com/p/XYZ/?igshid=1";
        assert_eq!(
            extract(text),
            vec![
                "https://www.youtube.com/watch?v=abc123",
                "https://instagram.com/p/XYZ",
            ]
        );
    }

    #[test]
    fn test_order_follows_text_not_platform_priority() {
        let text = "https://vm.tiktok.com/ZMabc/\nhttps://youtu.be/q\nhttps://instagram.com/reel/R1";
        let urls = extract_urls(text);
        let platforms: Vec<Platform> = urls.iter().map(CanonicalUrl::platform).collect();
        assert_eq!(
            platforms,
            vec![Platform::TikTok, Platform::YouTube, Platform::Instagram]
        );
    }

    #[test]
    fn test_instagram_query_does_not_hide_later_links() {
        // the Instagram query pattern runs to the end of the line
        let text = "https://instagram.com/p/A/?x=1 https://youtu.be/B";
        assert_eq!(
            extract(text),
            vec![
                "https://instagram.com/p/A",
                "https://www.youtube.com/watch?v=B",
            ]
        );
    }

    #[test]
    fn test_links_embedded_in_punctuation() {
        let text = "(https://m.tiktok.com/v/123), \"https://youtube.com/shorts/s1\"";
        assert_eq!(
            extract(text),
            vec![
                "https://m.tiktok.com/v/123",
                "https://www.youtube.com/shorts/s1",
            ]
        );
    }
}
