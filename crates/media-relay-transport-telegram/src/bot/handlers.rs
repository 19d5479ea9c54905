use super::resilient::send_html_resilient;
use super::views::{routing_text, status_text, welcome_text, NO_LINKS_TEXT};
use super::RelayStatus;
use anyhow::Result;
use media_relay_core::config::RelayConfig;
use media_relay_core::links::{extract_urls, RoutePlan};
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;

fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// List the commands
    #[command(description = "Show this help.")]
    Help,
    /// Show the relay session state
    #[command(description = "Show relay status.")]
    Status,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent.
pub async fn start(bot: Bot, msg: Message, config: Arc<RelayConfig>) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let user_name = get_user_name(&msg);
    info!("User {user_id} ({user_name}) initiated /start command.");

    send_html_resilient(&bot, msg.chat.id, welcome_text(config.helper_bots())).await?;
    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the help message cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    let text = html_escape::encode_text(&Command::descriptions().to_string()).into_owned();
    send_html_resilient(&bot, msg.chat.id, text).await?;
    Ok(())
}

/// Status handler; account details are shown to admins only.
///
/// # Errors
///
/// Returns an error if the status message cannot be sent.
pub async fn status(
    bot: Bot,
    msg: Message,
    config: Arc<RelayConfig>,
    relay: RelayStatus,
) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    info!("Status command received from user {user_id}.");

    let account = relay.account.as_ref().filter(|_| config.is_admin(user_id));
    send_html_resilient(&bot, msg.chat.id, status_text(&relay.current(), account)).await?;
    Ok(())
}

/// Text message handler: extracts supported links and replies with where
/// each one goes.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_text(bot: Bot, msg: Message, config: Arc<RelayConfig>) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let text = msg.text().unwrap_or_default();

    let urls = extract_urls(text);
    if urls.is_empty() {
        info!("No supported links in message from user {user_id}.");
        send_html_resilient(&bot, msg.chat.id, NO_LINKS_TEXT).await?;
        return Ok(());
    }

    for url in &urls {
        info!(platform = %url.platform(), user_id, "Received link {url}");
    }
    let plan = RoutePlan::build(urls, config.helper_bots());
    send_html_resilient(&bot, msg.chat.id, routing_text(&plan)).await?;
    Ok(())
}
