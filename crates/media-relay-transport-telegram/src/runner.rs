use crate::bot;
use crate::bot::handlers::Command;
use crate::bot::RelayStatus;
use media_relay_core::config::RelayConfig;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info};

/// Run the Telegram bot until it is stopped with Ctrl-C.
pub async fn run_bot(config: Arc<RelayConfig>, status: RelayStatus) {
    let bot = Bot::new(config.bot_token());
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![config, status])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_link_message),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    config: Arc<RelayConfig>,
    status: RelayStatus,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg, config).await,
        Command::Help => bot::handlers::help(bot, msg).await,
        Command::Status => bot::handlers::status(bot, msg, config, status).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_link_message(
    bot: Bot,
    msg: Message,
    config: Arc<RelayConfig>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_text(bot, msg, config).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
