//! Integration tests for what the relay bot answers and reports.

use chrono::{DateTime, TimeDelta, Utc};
use media_relay_core::links::{extract_urls, HelperBots, RoutePlan};
use media_relay_core::session::{ClientError, FloodWait};
use media_relay_transport_telegram::bot::views::{routing_text, NO_LINKS_TEXT};
use media_relay_transport_telegram::mtproto::classify_message;

fn helpers() -> HelperBots {
    HelperBots {
        youtube: "SaveYoutubeBot".to_string(),
        tiktok: "KeepMediaBot".to_string(),
    }
}

#[test]
fn mixed_message_is_routed_per_platform() {
    let message = "check these out:\n\
                   https://www.tiktok.com/@dancer/video/7300000000000000001?is_from_webapp=1\n\
                   https://youtube.com/shorts/Short_01?feature=share\n\
                   https://www.instagram.com/reel/CxYz123/?igshid=abc";
    let plan = RoutePlan::build(extract_urls(message), &helpers());
    let reply = routing_text(&plan);

    assert!(reply.starts_with("<b>Found 3 links</b>"));
    let tiktok = reply.find("@KeepMediaBot").unwrap_or(usize::MAX);
    let youtube = reply.find("@SaveYoutubeBot").unwrap_or(usize::MAX);
    let direct = reply.find("relay account").unwrap_or(usize::MAX);
    assert!(tiktok < youtube && youtube < direct, "{reply}");
    assert!(reply.contains("https://tiktok.com/@dancer/video/7300000000000000001"));
    assert!(reply.contains("https://www.youtube.com/shorts/Short_01"));
    assert!(reply.contains("https://instagram.com/reel/CxYz123"));
}

#[test]
fn message_without_links_gets_hint() {
    let urls = extract_urls("hello there, https://example.com/watch?v=abc");
    assert!(urls.is_empty());
    assert!(NO_LINKS_TEXT.contains("Instagram"));
}

#[test]
fn provider_flood_wait_becomes_structured_wait() {
    let ClientError::FloodWait { seconds } =
        classify_message("rpc error 420: FLOOD_WAIT caused by auth.sendCode (value: 3725)")
    else {
        panic!("flood wait not recognized");
    };
    let observed_at = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(20_000);
    let wait = FloodWait::observed(seconds, observed_at);

    assert_eq!(wait.remaining_seconds, 3725);
    assert_eq!(wait.available_at - observed_at, TimeDelta::seconds(3725));
    assert_eq!(wait.breakdown().to_string(), "1h 2m 5s");
}
