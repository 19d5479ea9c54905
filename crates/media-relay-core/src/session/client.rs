//! Seam between the session manager and the messaging client.

use crate::config::LoginInputs;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failures reported by a [`MessengerClient`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Provider demands a wait before the next attempt
    #[error("Flood wait of {seconds} seconds")]
    FloodWait {
        /// Whole seconds to wait
        seconds: u64,
    },
    /// One-time code was rejected or expired
    #[error("Invalid login code")]
    InvalidCode,
    /// Two-factor password was rejected
    #[error("Invalid two-factor password")]
    InvalidPassword,
    /// Account has two-factor authentication enabled
    #[error("Two-factor password required")]
    PasswordRequired,
    /// Phone number is not registered
    #[error("Phone number is not registered, sign up in an official app first")]
    SignUpRequired,
    /// Operation needs an open connection
    #[error("Client is not connected")]
    NotConnected,
    /// Transport level failure
    #[error("Network error: {0}")]
    Network(String),
    /// Anything else the provider reported
    #[error("{0}")]
    Other(String),
}

/// The account a session is logged in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    /// Telegram user id
    pub id: i64,
    /// Display name
    pub first_name: String,
    /// Public username, if any
    pub username: Option<String>,
}

impl fmt::Display for AccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(username) => write!(f, "{} (@{username})", self.first_name),
            None => f.write_str(&self.first_name),
        }
    }
}

/// Messaging client driven by the session manager.
///
/// Implementations own exactly one connection and its persisted session.
/// Methods take `&mut self`, so no two calls can be in flight at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessengerClient: Send {
    /// Open the connection, loading the persisted session if present.
    async fn connect(&mut self) -> Result<(), ClientError>;

    /// Returns `true` while a connection is open.
    fn is_connected(&self) -> bool;

    /// Whether the loaded session is logged in.
    async fn is_authorized(&mut self) -> Result<bool, ClientError>;

    /// Ask the provider to send a login code to `phone`.
    async fn request_login_code(&mut self, phone: &str) -> Result<(), ClientError>;

    /// Complete the login with the received `code`.
    ///
    /// Fails with [`ClientError::PasswordRequired`] when the account has a
    /// second factor; follow up with [`MessengerClient::check_password`].
    async fn sign_in(&mut self, code: &str) -> Result<AccountInfo, ClientError>;

    /// Complete a login that requires the two-factor `password`.
    async fn check_password(&mut self, password: &str) -> Result<AccountInfo, ClientError>;

    /// Fetch the logged-in account; a cheap round trip.
    async fn get_me(&mut self) -> Result<AccountInfo, ClientError>;

    /// Persist the session and close the connection.
    ///
    /// The connection counts as released afterwards even when an error is
    /// returned.
    async fn disconnect(&mut self) -> Result<(), ClientError>;
}

/// Supplies identity material during interactive authentication.
///
/// Each method is asked at most once per attempt, only when the step is
/// reached; `None` aborts the attempt.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Phone number in international format.
    async fn phone(&self) -> Option<String>;
    /// One-time code sent by the provider.
    async fn code(&self) -> Option<String>;
    /// Two-factor password.
    async fn password(&self) -> Option<String>;
}

#[async_trait]
impl CredentialSource for LoginInputs {
    async fn phone(&self) -> Option<String> {
        self.phone.clone()
    }

    async fn code(&self) -> Option<String> {
        self.code.clone()
    }

    async fn password(&self) -> Option<String> {
        self.password.clone()
    }
}
