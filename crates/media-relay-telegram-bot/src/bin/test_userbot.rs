//! Verifies that the persisted relay session is still logged in.

use dotenvy::dotenv;
use media_relay_core::config::{ClientCredentials, DEFAULT_LOG_LEVEL};
use media_relay_core::session::SessionManager;
use media_relay_telegram_bot::console::{print_config_error, print_session_error};
use media_relay_telegram_bot::logging::init_logging;
use media_relay_transport_telegram::mtproto::GrammersClient;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let credentials = ClientCredentials::load();
    let secrets: Vec<&str> = credentials
        .as_ref()
        .map(|c| vec![c.api_hash.as_str()])
        .unwrap_or_default();
    if let Err(e) = init_logging(DEFAULT_LOG_LEVEL, &secrets) {
        eprintln!("Failed to compile regex patterns: {e}");
        return ExitCode::FAILURE;
    }

    println!("Testing userbot connection...");
    let credentials = match credentials {
        Ok(credentials) => credentials,
        Err(e) => {
            print_config_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = SessionManager::new(GrammersClient::new(credentials));
    let cancel = session.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    println!("Starting client...");
    let result = match session.start().await {
        Ok(_) => session.test_connection().await,
        Err(e) => Err(e),
    };
    session.stop().await;

    match result {
        Ok(account) => {
            println!("✅ Already authenticated as: {account}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_session_error(&e);
            ExitCode::FAILURE
        }
    }
}
