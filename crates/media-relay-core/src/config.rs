//! Configuration and settings management
//!
//! Loads settings from optional config files and environment variables,
//! then validates them once into an immutable [`RelayConfig`].

use crate::links::HelperBots;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Default session name used to locate the persisted session file
pub const DEFAULT_SESSION_NAME: &str = "userbot_session";
/// Default helper bot for YouTube links
pub const DEFAULT_YOUTUBE_BOT: &str = "SaveYoutubeBot";
/// Default helper bot for TikTok links
pub const DEFAULT_TIKTOK_BOT: &str = "KeepMediaBot";
/// Default path of the video cache database
pub const DEFAULT_DATABASE_PATH: &str = "./db/videos.db";
/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
/// File extension of persisted sessions
pub const SESSION_FILE_EXTENSION: &str = "session";

/// Errors produced while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    /// Required values are absent
    #[error("Missing required configuration fields: {}", join_fields(.0))]
    Missing(Vec<RequiredField>),
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(RequiredField::env_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A configuration value that must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// Application id from my.telegram.org
    ApiId,
    /// Application hash from my.telegram.org
    ApiHash,
    /// Bot API token from @BotFather
    BotToken,
    /// Private storage channel id
    StorageChannelId,
}

impl RequiredField {
    /// Environment variable carrying the value.
    #[must_use]
    pub const fn env_name(&self) -> &'static str {
        match self {
            Self::ApiId => "API_ID",
            Self::ApiHash => "API_HASH",
            Self::BotToken => "BOT_TOKEN",
            Self::StorageChannelId => "STORAGE_CHANNEL_ID",
        }
    }

    /// Operator hint on where to obtain the value.
    #[must_use]
    pub const fn hint(&self) -> &'static str {
        match self {
            Self::ApiId | Self::ApiHash => "Get them from https://my.telegram.org/apps",
            Self::BotToken => "Get it from @BotFather on Telegram",
            Self::StorageChannelId => "Create a private channel and get its ID",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_name())
    }
}

/// Raw settings as read from files and the environment
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelaySettings {
    /// Telegram application id
    #[serde(default)]
    pub api_id: i32,
    /// Telegram application hash
    #[serde(default)]
    pub api_hash: String,
    /// Bot API token
    #[serde(default)]
    pub bot_token: String,
    /// Private storage channel id
    #[serde(default)]
    pub storage_channel_id: i64,
    /// Name of the persisted session
    #[serde(default = "default_session_name")]
    pub session_name: String,
    /// YouTube helper bot username
    #[serde(default = "default_youtube_bot")]
    pub youtube_bot_username: String,
    /// TikTok helper bot username
    #[serde(default = "default_tiktok_bot")]
    pub tiktok_bot_username: String,
    /// Video cache database path
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Comma-separated list of admin user IDs
    #[serde(rename = "admin_id")]
    pub admin_ids_str: Option<String>,
}

fn default_session_name() -> String {
    DEFAULT_SESSION_NAME.to_string()
}

fn default_youtube_bot() -> String {
    DEFAULT_YOUTUBE_BOT.to_string()
}

fn default_tiktok_bot() -> String {
    DEFAULT_TIKTOK_BOT.to_string()
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            api_id: 0,
            api_hash: String::new(),
            bot_token: String::new(),
            storage_channel_id: 0,
            session_name: default_session_name(),
            youtube_bot_username: default_youtube_bot(),
            tiktok_bot_username: default_tiktok_bot(),
            database_path: default_database_path(),
            log_level: default_log_level(),
            admin_ids_str: None,
        }
    }
}

/// Build the layered configuration source.
///
/// # Errors
///
/// Returns a `config::ConfigError` if a present source cannot be read.
pub fn build_config() -> Result<Config, config::ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE variables map onto the snake_case fields
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl RelaySettings {
    /// Load settings from config files and environment.
    ///
    /// # Errors
    ///
    /// Returns a `config::ConfigError` if loading or deserialization fails.
    pub fn new() -> Result<Self, config::ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Returns the set of admin Telegram IDs.
    ///
    /// Tokens that are not numeric are ignored.
    #[must_use]
    pub fn admin_ids(&self) -> HashSet<i64> {
        self.admin_ids_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .filter_map(|id| id.parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn missing_client_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.api_id == 0 {
            missing.push(RequiredField::ApiId);
        }
        if self.api_hash.trim().is_empty() {
            missing.push(RequiredField::ApiHash);
        }
        missing
    }
}

/// Values needed to open the MTProto client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Telegram application id
    pub api_id: i32,
    /// Telegram application hash
    pub api_hash: String,
    /// Name of the persisted session
    pub session_name: String,
}

impl ClientCredentials {
    /// Validates the client subset of `settings`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` listing every absent field.
    pub fn from_settings(settings: &RelaySettings) -> Result<Self, ConfigError> {
        let missing = settings.missing_client_fields();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        Ok(Self {
            api_id: settings.api_id,
            api_hash: settings.api_hash.clone(),
            session_name: settings.session_name.clone(),
        })
    }

    /// Load and validate only what the client needs.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a field is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_settings(&RelaySettings::new()?)
    }

    /// Path of the persisted session file.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.{SESSION_FILE_EXTENSION}", self.session_name))
    }
}

/// Fully validated application configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    client: ClientCredentials,
    bot_token: String,
    storage_channel_id: i64,
    helper_bots: HelperBots,
    database_path: PathBuf,
    log_level: String,
    admin_ids: HashSet<i64>,
}

impl RelayConfig {
    /// Load settings and validate them.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_relay_core::config::RelayConfig;
    ///
    /// let config = RelayConfig::load().expect("invalid configuration");
    /// println!("session file: {}", config.client().session_file().display());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or required fields are missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_settings(RelaySettings::new()?)
    }

    /// Validate already loaded settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` listing every absent required field.
    pub fn from_settings(settings: RelaySettings) -> Result<Self, ConfigError> {
        let mut missing = settings.missing_client_fields();
        if settings.bot_token.trim().is_empty() {
            missing.push(RequiredField::BotToken);
        }
        if settings.storage_channel_id == 0 {
            missing.push(RequiredField::StorageChannelId);
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let admin_ids = settings.admin_ids();
        Ok(Self {
            client: ClientCredentials {
                api_id: settings.api_id,
                api_hash: settings.api_hash,
                session_name: settings.session_name,
            },
            bot_token: settings.bot_token,
            storage_channel_id: settings.storage_channel_id,
            helper_bots: HelperBots {
                youtube: settings.youtube_bot_username.trim_start_matches('@').to_string(),
                tiktok: settings.tiktok_bot_username.trim_start_matches('@').to_string(),
            },
            database_path: PathBuf::from(settings.database_path),
            log_level: settings.log_level,
            admin_ids,
        })
    }

    /// MTProto client credentials.
    #[must_use]
    pub const fn client(&self) -> &ClientCredentials {
        &self.client
    }

    /// Bot API token.
    #[must_use]
    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    /// Private storage channel id.
    #[must_use]
    pub const fn storage_channel_id(&self) -> i64 {
        self.storage_channel_id
    }

    /// Helper bot usernames.
    #[must_use]
    pub const fn helper_bots(&self) -> &HelperBots {
        &self.helper_bots
    }

    /// Video cache database path.
    #[must_use]
    pub fn database_path(&self) -> &std::path::Path {
        &self.database_path
    }

    /// Configured log level.
    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Returns `true` if `user_id` is an admin.
    #[must_use]
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// Identity material for a non-interactive login, read from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginInputs {
    /// Phone number in international format
    pub phone: Option<String>,
    /// One-time login code
    pub code: Option<String>,
    /// Two-factor password
    pub password: Option<String>,
}

impl LoginInputs {
    /// Read `PHONE`, `CODE` and `PASSWORD`; empty values count as absent.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            phone: read("PHONE"),
            code: read("CODE"),
            password: read("PASSWORD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn complete_settings() -> RelaySettings {
        RelaySettings {
            api_id: 12345,
            api_hash: "0123456789abcdef".to_string(),
            bot_token: "123456:ABC".to_string(),
            storage_channel_id: -100_123,
            ..RelaySettings::default()
        }
    }

    #[test]
    fn test_complete_settings_validate() -> Result<(), ConfigError> {
        let config = RelayConfig::from_settings(complete_settings())?;
        assert_eq!(config.client().api_id, 12345);
        assert_eq!(config.storage_channel_id(), -100_123);
        assert_eq!(
            config.database_path(),
            std::path::Path::new(DEFAULT_DATABASE_PATH)
        );
        assert_eq!(config.helper_bots().youtube, DEFAULT_YOUTUBE_BOT);
        assert_eq!(config.helper_bots().tiktok, DEFAULT_TIKTOK_BOT);
        assert_eq!(
            config.client().session_file(),
            PathBuf::from("userbot_session.session")
        );
        Ok(())
    }

    #[test]
    fn test_missing_fields_are_all_listed() {
        let Err(ConfigError::Missing(missing)) = RelayConfig::from_settings(RelaySettings::default())
        else {
            panic!("expected missing fields");
        };
        assert_eq!(
            missing,
            vec![
                RequiredField::ApiId,
                RequiredField::ApiHash,
                RequiredField::BotToken,
                RequiredField::StorageChannelId,
            ]
        );
    }

    #[test]
    fn test_missing_error_message() {
        let err = ConfigError::Missing(vec![RequiredField::ApiId, RequiredField::BotToken]);
        assert_eq!(
            err.to_string(),
            "Missing required configuration fields: API_ID, BOT_TOKEN"
        );
    }

    #[test]
    fn test_client_credentials_need_only_api_fields() {
        let settings = RelaySettings {
            api_id: 1,
            api_hash: "hash".to_string(),
            ..RelaySettings::default()
        };
        assert!(ClientCredentials::from_settings(&settings).is_ok());

        let settings = RelaySettings {
            api_id: 1,
            ..RelaySettings::default()
        };
        let Err(ConfigError::Missing(missing)) = ClientCredentials::from_settings(&settings) else {
            panic!("expected missing api hash");
        };
        assert_eq!(missing, vec![RequiredField::ApiHash]);
    }

    #[test]
    fn test_helper_usernames_drop_at_sign() -> Result<(), ConfigError> {
        let settings = RelaySettings {
            youtube_bot_username: "@YtHelper".to_string(),
            ..complete_settings()
        };
        let config = RelayConfig::from_settings(settings)?;
        assert_eq!(config.helper_bots().youtube, "YtHelper");
        Ok(())
    }

    #[test]
    fn test_admin_list_parsing() {
        let mut settings = complete_settings();

        settings.admin_ids_str = Some("123,456".to_string());
        let admins = settings.admin_ids();
        assert!(admins.contains(&123));
        assert!(admins.contains(&456));
        assert_eq!(admins.len(), 2);

        settings.admin_ids_str = Some("abc, 777".to_string());
        let admins = settings.admin_ids();
        assert!(admins.contains(&777));
        assert_eq!(admins.len(), 1);

        settings.admin_ids_str = None;
        assert!(settings.admin_ids().is_empty());
    }

    // Single test touching the process environment to avoid races
    #[test]
    fn test_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("API_ID", "424242");
        env::set_var("API_HASH", "deadbeef");
        env::set_var("SESSION_NAME", "relay_test");
        env::set_var("PHONE", " +15550001111 ");
        env::set_var("CODE", "");

        let settings = RelaySettings::new()?;
        assert_eq!(settings.api_id, 424_242);
        assert_eq!(settings.api_hash, "deadbeef");

        let credentials = ClientCredentials::from_settings(&settings)?;
        assert_eq!(credentials.session_file(), PathBuf::from("relay_test.session"));

        let inputs = LoginInputs::from_env();
        assert_eq!(inputs.phone.as_deref(), Some("+15550001111"));
        assert_eq!(inputs.code, None);

        for key in ["API_ID", "API_HASH", "SESSION_NAME", "PHONE", "CODE"] {
            env::remove_var(key);
        }
        Ok(())
    }
}
