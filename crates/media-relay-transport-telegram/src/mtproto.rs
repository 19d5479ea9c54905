//! grammers-backed [`MessengerClient`] for the relay account.
//!
//! The session file is loaded on connect and written back on disconnect.
//! Logging out is never done here: the persisted session is what lets the
//! relay start without a new login code.

use async_trait::async_trait;
use grammers_client::types::{LoginToken, PasswordToken, User};
use grammers_client::{Client, Config, InitParams, InvocationError, SignInError};
use grammers_session::Session;
use lazy_regex::{lazy_regex, Lazy};
use media_relay_core::config::ClientCredentials;
use media_relay_core::session::{AccountInfo, ClientError, MessengerClient};
use regex::Regex;
use tracing::{debug, info};

/// `FLOOD_WAIT_3725` as sent on the wire
static FLOOD_WAIT_SUFFIX: Lazy<Regex> = lazy_regex!(r"FLOOD_WAIT_(\d+)");

/// `FLOOD_WAIT ... value: 3725` as rendered by grammers
static FLOOD_WAIT_VALUE: Lazy<Regex> =
    lazy_regex!(r"(?i)FLOOD_WAIT\b.*?value:?\s*(?:Some\()?(\d+)");

/// `A wait of 3725 seconds is required`
static WAIT_OF_SECONDS: Lazy<Regex> = lazy_regex!(r"(?i)wait of (\d+) seconds");

/// Relay account connection over MTProto.
pub struct GrammersClient {
    credentials: ClientCredentials,
    client: Option<Client>,
    login_token: Option<LoginToken>,
    password_token: Option<PasswordToken>,
}

impl GrammersClient {
    /// Client for the session named in `credentials`; nothing is opened yet.
    #[must_use]
    pub const fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            client: None,
            login_token: None,
            password_token: None,
        }
    }

    fn connected(&self) -> Result<&Client, ClientError> {
        self.client.as_ref().ok_or(ClientError::NotConnected)
    }
}

#[async_trait]
impl MessengerClient for GrammersClient {
    async fn connect(&mut self) -> Result<(), ClientError> {
        let path = self.credentials.session_file();
        debug!("Loading session from {}", path.display());
        let session = Session::load_file_or_create(&path)
            .map_err(|e| ClientError::Other(format!("Failed to load session file: {e}")))?;

        let client = Client::connect(Config {
            session,
            api_id: self.credentials.api_id,
            api_hash: self.credentials.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| classify_message(&e.to_string()))?;

        info!("Connected to Telegram");
        self.client = Some(client);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    async fn is_authorized(&mut self) -> Result<bool, ClientError> {
        self.connected()?
            .is_authorized()
            .await
            .map_err(|e| classify_invocation(&e))
    }

    async fn request_login_code(&mut self, phone: &str) -> Result<(), ClientError> {
        let token = self
            .connected()?
            .request_login_code(phone)
            .await
            .map_err(|e| classify_message(&e.to_string()))?;
        self.login_token = Some(token);
        Ok(())
    }

    async fn sign_in(&mut self, code: &str) -> Result<AccountInfo, ClientError> {
        let token = self
            .login_token
            .take()
            .ok_or_else(|| ClientError::Other("No login code was requested".to_string()))?;
        match self.connected()?.sign_in(&token, code).await {
            Ok(user) => Ok(account_info(&user)),
            Err(SignInError::PasswordRequired(password_token)) => {
                self.password_token = Some(password_token);
                Err(ClientError::PasswordRequired)
            }
            Err(e) => Err(classify_sign_in(e)),
        }
    }

    async fn check_password(&mut self, password: &str) -> Result<AccountInfo, ClientError> {
        let token = self
            .password_token
            .take()
            .ok_or_else(|| ClientError::Other("No password was requested".to_string()))?;
        let user = self
            .connected()?
            .check_password(token, password)
            .await
            .map_err(classify_sign_in)?;
        Ok(account_info(&user))
    }

    async fn get_me(&mut self) -> Result<AccountInfo, ClientError> {
        let user = self
            .connected()?
            .get_me()
            .await
            .map_err(|e| classify_invocation(&e))?;
        Ok(account_info(&user))
    }

    async fn disconnect(&mut self) -> Result<(), ClientError> {
        self.login_token = None;
        self.password_token = None;
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        let path = self.credentials.session_file();
        let saved = client.session().save_to_file(&path);
        drop(client);
        info!("Disconnected from Telegram");
        saved.map_err(|e| ClientError::Other(format!("Failed to save session file: {e}")))
    }
}

fn account_info(user: &User) -> AccountInfo {
    AccountInfo {
        id: user.id(),
        first_name: user.full_name(),
        username: user.username().map(str::to_string),
    }
}

fn classify_sign_in(error: SignInError) -> ClientError {
    match error {
        SignInError::InvalidCode => ClientError::InvalidCode,
        SignInError::InvalidPassword => ClientError::InvalidPassword,
        SignInError::SignUpRequired { .. } => ClientError::SignUpRequired,
        SignInError::PasswordRequired(_) => ClientError::PasswordRequired,
        SignInError::Other(e) => classify_invocation(&e),
    }
}

fn classify_invocation(error: &InvocationError) -> ClientError {
    match error {
        InvocationError::Rpc(rpc) if rpc.name == "FLOOD_WAIT" => ClientError::FloodWait {
            seconds: rpc.value.map_or(0, u64::from),
        },
        InvocationError::Rpc(_) => classify_message(&error.to_string()),
        other => ClientError::Network(other.to_string()),
    }
}

/// Classify an error that is only available as text.
#[must_use]
pub fn classify_message(message: &str) -> ClientError {
    if let Some(seconds) = parse_flood_wait(message) {
        return ClientError::FloodWait { seconds };
    }
    if message.contains("PHONE_CODE_INVALID") || message.contains("PHONE_CODE_EXPIRED") {
        return ClientError::InvalidCode;
    }
    if message.contains("PASSWORD_HASH_INVALID") {
        return ClientError::InvalidPassword;
    }
    if message.contains("PHONE_NUMBER_UNOCCUPIED") {
        return ClientError::SignUpRequired;
    }
    ClientError::Other(message.to_string())
}

/// Wait duration in seconds carried by a flood-wait error message.
#[must_use]
pub fn parse_flood_wait(message: &str) -> Option<u64> {
    [&FLOOD_WAIT_SUFFIX, &FLOOD_WAIT_VALUE, &WAIT_OF_SECONDS]
        .iter()
        .find_map(|re| re.captures(message))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
