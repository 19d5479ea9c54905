//! Reports whether the relay account can log in right now.
//!
//! Exits 0 when nothing blocks a start, 1 when throttled, on failure or
//! when interrupted.

use dotenvy::dotenv;
use media_relay_core::config::{ClientCredentials, DEFAULT_LOG_LEVEL};
use media_relay_core::session::{ProbeReport, SessionManager};
use media_relay_telegram_bot::console::{flood_wait_lines, print_config_error};
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

    println!("🔍 Checking flood wait status...");
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

    println!("⚡ Connecting to Telegram...");
    match session.probe().await {
        ProbeReport::Ready {
            account: Some(account),
        } => {
            println!("✅ No flood wait, the bot can be started.");
            println!("👤 Account: {account}");
            println!("\n🚀 Start the bot now: media-relay-telegram-bot");
            ExitCode::SUCCESS
        }
        ProbeReport::Ready { account: None } => {
            println!("⚠️ Authorization is required, but there is no flood wait.");
            println!("\n🚀 Run setup, then start the bot.");
            ExitCode::SUCCESS
        }
        ProbeReport::RateLimited(wait) => {
            for line in flood_wait_lines(&wait) {
                println!("{line}");
            }
            println!("\n💡 Wait until the restriction ends.");
            ExitCode::FAILURE
        }
        ProbeReport::Failed(reason) => {
            println!("❓ Unexpected error: {reason}");
            ExitCode::FAILURE
        }
        ProbeReport::Interrupted => {
            println!("\n❌ Check interrupted.");
            ExitCode::FAILURE
        }
    }
}
