//! Reply texts for the relay bot, rendered as Telegram HTML.

use html_escape::encode_text;
use media_relay_core::links::{HelperBots, RoutePlan};
use media_relay_core::session::{AccountInfo, SessionState};
use std::fmt::Write;

/// Reply for messages without a supported link.
pub const NO_LINKS_TEXT: &str =
    "No supported links found. Send an Instagram, YouTube or TikTok link.";

/// Greeting for `/start`.
#[must_use]
pub fn welcome_text(helpers: &HelperBots) -> String {
    format!(
        "<b>Media relay</b>\n\n\
        Send me Instagram, YouTube or TikTok links and I will pass them on:\n\
        • Instagram: downloaded by the relay account\n\
        • YouTube: @{}\n\
        • TikTok: @{}\n\n\
        Use /help to list the commands.",
        encode_text(&helpers.youtube),
        encode_text(&helpers.tiktok),
    )
}

/// Links grouped by the account that downloads them.
#[must_use]
pub fn routing_text(plan: &RoutePlan) -> String {
    let count = plan.len();
    let mut text = format!(
        "<b>Found {count} link{}</b>\n",
        if count == 1 { "" } else { "s" }
    );
    for (route, urls) in plan.groups() {
        let _ = write!(text, "\n<b>{}</b>\n", encode_text(&route.to_string()));
        for url in urls {
            let _ = writeln!(text, "• {}", encode_text(url.as_str()));
        }
    }
    text
}

/// Session overview for `/status`; account details only when `account` is given.
#[must_use]
pub fn status_text(state: &SessionState, account: Option<&AccountInfo>) -> String {
    let mut text = format!(
        "<b>Relay status</b>\n\nSession: {}",
        encode_text(&state.to_string())
    );
    if let Some(account) = account {
        let _ = write!(text, "\nAccount: {}", encode_text(&account.to_string()));
    }
    text
}
