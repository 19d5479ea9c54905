use dotenvy::dotenv;
use media_relay_core::config::{RelayConfig, DEFAULT_LOG_LEVEL};
use media_relay_core::session::{SessionError, SessionManager};
use media_relay_telegram_bot::logging::init_logging;
use media_relay_transport_telegram::bot::RelayStatus;
use media_relay_transport_telegram::mtproto::GrammersClient;
use media_relay_transport_telegram::runner::run_bot;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file
    dotenv().ok();

    let config = RelayConfig::load();
    let (log_level, secrets) = match &config {
        Ok(c) => (c.log_level(), vec![c.bot_token(), c.client().api_hash.as_str()]),
        Err(_) => (DEFAULT_LOG_LEVEL, Vec::new()),
    };
    if let Err(e) = init_logging(log_level, &secrets) {
        eprintln!("Failed to compile regex patterns: {e}");
        return ExitCode::FAILURE;
    }

    let config = match config {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        storage_channel_id = config.storage_channel_id(),
        database_path = %config.database_path().display(),
        "Configuration loaded successfully."
    );
    info!("Starting media relay bot...");

    let mut session = SessionManager::new(GrammersClient::new(config.client().clone()));
    let account = match session.start().await {
        Ok(account) => account,
        Err(SessionError::RateLimited(wait)) => {
            error!(
                remaining_seconds = wait.remaining_seconds,
                "Flood wait: {} left, the bot can be started at {}",
                wait.breakdown(),
                wait.available_at_local()
            );
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("Failed to start the relay session: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("Relay account ready: {account}");

    let status = RelayStatus {
        state: session.subscribe(),
        account: Some(account),
    };
    run_bot(config, status).await;

    session.stop().await;
    info!("Bot stopped.");
    ExitCode::SUCCESS
}
