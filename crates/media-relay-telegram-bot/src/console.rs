use async_trait::async_trait;
use media_relay_core::config::{ConfigError, LoginInputs};
use media_relay_core::session::{AuthFailure, CredentialSource, FloodWait, SessionError};
use std::io::{self, BufRead, Write};
use std::thread;
use tokio::sync::oneshot;
use tracing::warn;

/// Login inputs taken from the environment, asking on stdin for anything
/// that is missing.
pub struct PromptingCredentials {
    env: LoginInputs,
}

impl PromptingCredentials {
    /// Wrap values already read from the environment.
    #[must_use]
    pub const fn new(env: LoginInputs) -> Self {
        Self { env }
    }
}

#[async_trait]
impl CredentialSource for PromptingCredentials {
    async fn phone(&self) -> Option<String> {
        match &self.env.phone {
            Some(phone) => Some(phone.clone()),
            None => prompt("Phone number (international format): ").await,
        }
    }

    async fn code(&self) -> Option<String> {
        match &self.env.code {
            Some(code) => Some(code.clone()),
            None => prompt("Login code: ").await,
        }
    }

    async fn password(&self) -> Option<String> {
        match &self.env.password {
            Some(password) => Some(password.clone()),
            None => prompt("Two-factor password: ").await,
        }
    }
}

/// Ask on stdout and read one line from stdin; empty answers count as none.
async fn prompt(question: &'static str) -> Option<String> {
    read_answer(question, || io::stdin().lock()).await
}

/// Read the answer on a detached thread; an unanswered prompt must not
/// block runtime shutdown after an interrupt.
async fn read_answer<F, R>(question: &'static str, open: F) -> Option<String>
where
    F: FnOnce() -> R + Send + 'static,
    R: BufRead,
{
    let (tx, rx) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("stdin-prompt".to_string())
        .spawn(move || {
            // the receiver is gone once the prompt was interrupted
            let _ = tx.send(ask_line(question, &mut open()));
        });
    if let Err(e) = spawned {
        warn!("Failed to start the prompt thread: {e}");
        return None;
    }

    match rx.await {
        Ok(Ok(line)) => Some(line.trim().to_string()).filter(|s| !s.is_empty()),
        Ok(Err(e)) => {
            warn!("Failed to read from stdin: {e}");
            None
        }
        Err(e) => {
            warn!("Prompt thread ended without an answer: {e}");
            None
        }
    }
}

fn ask_line(question: &str, input: &mut impl BufRead) -> io::Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(question.as_bytes())?;
    stdout.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

/// Lines describing a flood wait for the operator.
#[must_use]
pub fn flood_wait_lines(wait: &FloodWait) -> Vec<String> {
    let breakdown = wait.breakdown();
    vec![
        format!(
            "❌ Flood wait: {} seconds must pass before logging in",
            wait.remaining_seconds
        ),
        format!(
            "⏰ Time left: {} hours, {} minutes, {} seconds",
            breakdown.hours, breakdown.minutes, breakdown.seconds
        ),
        format!(
            "🕒 The bot can be started at: {}",
            wait.available_at_local()
        ),
    ]
}

/// Print what the operator must fix in the configuration.
pub fn print_config_error(error: &ConfigError) {
    match error {
        ConfigError::Missing(fields) => {
            for field in fields {
                println!("❌ {} is required in .env file", field.env_name());
                println!("   {}", field.hint());
            }
        }
        ConfigError::Load(e) => println!("❌ Failed to load configuration: {e}"),
    }
}

/// Print targeted guidance for a failed session operation.
pub fn print_session_error(error: &SessionError) {
    match error {
        SessionError::RateLimited(wait) => {
            for line in flood_wait_lines(wait) {
                println!("{line}");
            }
            println!("\n💡 Wait until the restriction ends, then try again.");
        }
        SessionError::Authentication(AuthFailure::NotAuthorized) => {
            println!("❌ Not authenticated. Please run setup first.");
        }
        SessionError::Authentication(failure) => {
            println!("❌ Authentication failed: {failure}");
            println!("   Check PHONE, CODE and PASSWORD and run setup again.");
        }
        SessionError::Cancelled => println!("\n❌ Interrupted."),
        SessionError::NotAuthenticated | SessionError::Failed(_) => {
            println!("❌ Error: {error}");
        }
    }
}
