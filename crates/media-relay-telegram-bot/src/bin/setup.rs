//! One-time interactive login that creates the persisted relay session.
//!
//! `PHONE`, `CODE` and `PASSWORD` are taken from the environment when set;
//! anything missing is asked for on the terminal.

use dotenvy::dotenv;
use media_relay_core::config::{LoginInputs, RelayConfig, DEFAULT_LOG_LEVEL};
use media_relay_core::session::SessionManager;
use media_relay_telegram_bot::console::{
    print_config_error, print_session_error, PromptingCredentials,
};
use media_relay_telegram_bot::logging::init_logging;
use media_relay_transport_telegram::mtproto::GrammersClient;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let config = RelayConfig::load();
    let inputs = LoginInputs::from_env();

    let mut secrets: Vec<&str> = inputs
        .code
        .iter()
        .chain(inputs.password.iter())
        .map(String::as_str)
        .collect();
    if let Ok(config) = &config {
        secrets.push(config.bot_token());
        secrets.push(config.client().api_hash.as_str());
    }
    if let Err(e) = init_logging(DEFAULT_LOG_LEVEL, &secrets) {
        eprintln!("Failed to compile regex patterns: {e}");
        return ExitCode::FAILURE;
    }

    println!("=== Media relay setup ===\n");
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            print_config_error(&e);
            return ExitCode::FAILURE;
        }
    };
    println!("✅ Configuration is valid!\n");

    let mut session = SessionManager::new(GrammersClient::new(config.client().clone()));
    let cancel = session.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    println!("🔐 Setting up relay account authentication...");
    println!("You need to log in with your Telegram account.");
    println!(
        "This is a one-time step that creates {}.\n",
        config.client().session_file().display()
    );

    let credentials = PromptingCredentials::new(inputs);
    let result = match session.authenticate_interactive(&credentials).await {
        Ok(account) => {
            println!("\n✅ Authenticated as {account}");
            println!("🔍 Testing the connection...");
            session.test_connection().await
        }
        Err(e) => Err(e),
    };
    session.stop().await;

    match result {
        Ok(_) => {
            println!("✅ Connection works!");
            println!("\n🎉 Setup completed successfully!");
            println!("\nNext steps:");
            println!("1. Start the bot: media-relay-telegram-bot");
            println!("2. Send Instagram, YouTube or TikTok links to the bot");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_session_error(&e);
            println!("❌ Setup failed");
            ExitCode::FAILURE
        }
    }
}
