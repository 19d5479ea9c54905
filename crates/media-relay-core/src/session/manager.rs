use super::client::{AccountInfo, ClientError, CredentialSource, MessengerClient};
use super::clock::{Clock, SystemClock};
use super::flood::FloodWait;
use super::SessionState;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why an authentication attempt was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthFailure {
    /// The credential source had nothing for a required step
    #[error("no {0} was provided")]
    MissingInput(&'static str),
    /// The provider rejected the login code
    #[error("the login code was rejected")]
    InvalidCode,
    /// The provider rejected the two-factor password
    #[error("the two-factor password was rejected")]
    InvalidPassword,
    /// The phone number has no account
    #[error("the phone number is not registered")]
    SignUpRequired,
    /// The persisted session is not logged in
    #[error("the persisted session is not authorized, run setup first")]
    NotAuthorized,
}

/// Structured outcome of a failed session operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Throttled; retry at or after `available_at`
    #[error("Flood wait: {} left, available at {}", .0.breakdown(), .0.available_at)]
    RateLimited(FloodWait),
    /// Credentials or challenge rejected
    #[error("Authentication failed: {0}")]
    Authentication(AuthFailure),
    /// Operation requires an authenticated session
    #[error("Session is not authenticated")]
    NotAuthenticated,
    /// Interrupted through the cancellation token
    #[error("Operation cancelled")]
    Cancelled,
    /// Any other failure, with the underlying message
    #[error("{0}")]
    Failed(String),
}

/// Result of a connectivity probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    /// Nothing blocks a start; `account` is `None` when the session still
    /// needs interactive authentication
    Ready {
        /// Logged-in account, if the session is authorized
        account: Option<AccountInfo>,
    },
    /// The provider throttles the account
    RateLimited(FloodWait),
    /// The probe failed for the given reason
    Failed(String),
    /// The probe was cancelled
    Interrupted,
}

impl ProbeReport {
    /// Returns `true` when nothing blocks starting the relay.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

impl From<SessionError> for ProbeReport {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::RateLimited(wait) => Self::RateLimited(wait),
            SessionError::Cancelled => Self::Interrupted,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Owner of the process-wide messaging connection.
///
/// Every operation takes `&mut self`, so authentication attempts against
/// the persisted session are serialized by construction. Failed and
/// cancelled operations tear the connection down before returning.
pub struct SessionManager<C> {
    client: C,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    state: watch::Sender<SessionState>,
    account: Option<AccountInfo>,
}

impl<C: MessengerClient> SessionManager<C> {
    /// Manager using the wall clock.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self::with_clock(client, Arc::new(SystemClock))
    }

    /// Manager using `clock` for flood-wait bookkeeping.
    #[must_use]
    pub fn with_clock(client: C, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            client,
            clock,
            cancel: CancellationToken::new(),
            state,
            account: None,
        }
    }

    /// Token that interrupts in-flight operations when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Account of the authenticated session.
    #[must_use]
    pub const fn account(&self) -> Option<&AccountInfo> {
        self.account.as_ref()
    }

    /// Returns `true` while the underlying connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// The wrapped client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Connect with the persisted session, without interactive login.
    ///
    /// # Errors
    ///
    /// - `RateLimited` if throttled, including retries before `available_at`
    /// - `Authentication(NotAuthorized)` if the session is not logged in
    /// - `Cancelled` if the token fired
    /// - `Failed` for anything else
    pub async fn start(&mut self) -> Result<AccountInfo, SessionError> {
        if let Some(account) = self.authenticated_account() {
            return Ok(account);
        }
        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SessionError::Cancelled),
            result = self.start_attempt() => result,
        };
        self.finish_attempt(outcome).await
    }

    /// Log in, asking `credentials` for whatever the provider requires.
    ///
    /// An already authenticated session returns its account without asking
    /// for anything, as does a persisted session that is still authorized.
    ///
    /// # Errors
    ///
    /// - `RateLimited` if throttled, including retries before `available_at`
    /// - `Authentication` if a credential is missing or rejected
    /// - `Cancelled` if the token fired
    /// - `Failed` for anything else
    pub async fn authenticate_interactive(
        &mut self,
        credentials: &dyn CredentialSource,
    ) -> Result<AccountInfo, SessionError> {
        if let Some(account) = self.authenticated_account() {
            debug!("Session already authenticated, skipping login");
            return Ok(account);
        }
        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SessionError::Cancelled),
            result = self.interactive_attempt(credentials) => result,
        };
        self.finish_attempt(outcome).await
    }

    /// Confirm the session is usable with a round trip to the provider.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` before a successful login, otherwise the
    /// classified provider error. The connection is released before an
    /// error is returned.
    pub async fn test_connection(&mut self) -> Result<AccountInfo, SessionError> {
        if !self.state().is_authenticated() || !self.client.is_connected() {
            return Err(SessionError::NotAuthenticated);
        }
        let cancel = self.cancel.clone();
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = self.client.get_me() => Some(result),
        };
        match result {
            Some(Ok(account)) => {
                info!("Connection test passed for {account}");
                self.account = Some(account.clone());
                Ok(account)
            }
            Some(Err(e)) => {
                let error = self.fail(e);
                self.stop().await;
                Err(error)
            }
            None => {
                self.stop().await;
                Err(SessionError::Cancelled)
            }
        }
    }

    /// Connect, report whether anything blocks a start, and disconnect.
    ///
    /// The connection is released on every path, including cancellation.
    pub async fn probe(&mut self) -> ProbeReport {
        let cancel = self.cancel.clone();
        let report = tokio::select! {
            biased;
            () = cancel.cancelled() => ProbeReport::Interrupted,
            report = self.probe_attempt() => report,
        };
        self.stop().await;
        report
    }

    /// Release the connection. Safe to call repeatedly or before connecting.
    ///
    /// `RateLimited` and `Failed` are kept so callers can still see the
    /// gate and the reason.
    pub async fn stop(&mut self) {
        if self.client.is_connected() {
            info!("Disconnecting from Telegram...");
            if let Err(e) = self.client.disconnect().await {
                warn!("Failed to disconnect cleanly: {e}");
            }
        }
        if matches!(
            self.state(),
            SessionState::Authenticated | SessionState::Authenticating
        ) {
            self.transition(SessionState::Disconnected);
        }
        self.account = None;
    }

    async fn start_attempt(&mut self) -> Result<AccountInfo, SessionError> {
        self.check_gate()?;
        self.transition(SessionState::Authenticating);
        info!("Connecting to Telegram with the persisted session...");
        self.ensure_connected().await?;

        let authorized = self.client.is_authorized().await.map_err(|e| self.fail(e))?;
        if !authorized {
            return Err(self.fail_auth(AuthFailure::NotAuthorized));
        }
        let account = self.client.get_me().await.map_err(|e| self.fail(e))?;
        Ok(self.authenticated(account))
    }

    async fn interactive_attempt(
        &mut self,
        credentials: &dyn CredentialSource,
    ) -> Result<AccountInfo, SessionError> {
        self.check_gate()?;
        self.transition(SessionState::Authenticating);
        self.ensure_connected().await?;

        if self.client.is_authorized().await.map_err(|e| self.fail(e))? {
            info!("Persisted session is already authorized");
            let account = self.client.get_me().await.map_err(|e| self.fail(e))?;
            return Ok(self.authenticated(account));
        }

        let Some(phone) = credentials.phone().await else {
            return Err(self.fail_auth(AuthFailure::MissingInput("phone number")));
        };
        info!("Requesting login code...");
        self.client
            .request_login_code(&phone)
            .await
            .map_err(|e| self.fail(e))?;

        let Some(code) = credentials.code().await else {
            return Err(self.fail_auth(AuthFailure::MissingInput("login code")));
        };
        let account = match self.client.sign_in(&code).await {
            Ok(account) => account,
            Err(ClientError::PasswordRequired) => {
                info!("Two-factor authentication is enabled");
                let Some(password) = credentials.password().await else {
                    return Err(self.fail_auth(AuthFailure::MissingInput("two-factor password")));
                };
                self.client
                    .check_password(&password)
                    .await
                    .map_err(|e| self.fail(e))?
            }
            Err(e) => return Err(self.fail(e)),
        };
        Ok(self.authenticated(account))
    }

    async fn probe_attempt(&mut self) -> ProbeReport {
        if let Err(e) = self.check_gate() {
            return e.into();
        }
        self.transition(SessionState::Authenticating);
        if let Err(e) = self.ensure_connected().await {
            return e.into();
        }
        match self.client.is_authorized().await {
            Ok(true) => match self.client.get_me().await {
                Ok(account) => ProbeReport::Ready {
                    account: Some(self.authenticated(account)),
                },
                Err(e) => self.fail(e).into(),
            },
            Ok(false) => {
                info!("Connected, but the session still needs authorization");
                self.transition(SessionState::Unauthenticated);
                ProbeReport::Ready { account: None }
            }
            Err(e) => self.fail(e).into(),
        }
    }

    async fn finish_attempt(
        &mut self,
        outcome: Result<AccountInfo, SessionError>,
    ) -> Result<AccountInfo, SessionError> {
        if outcome.is_err() {
            self.stop().await;
        }
        outcome
    }

    async fn ensure_connected(&mut self) -> Result<(), SessionError> {
        if self.client.is_connected() {
            return Ok(());
        }
        self.client.connect().await.map_err(|e| self.fail(e))
    }

    /// Rejects attempts made before a flood wait has elapsed.
    fn check_gate(&self) -> Result<(), SessionError> {
        let SessionState::RateLimited(available_at) = self.state() else {
            return Ok(());
        };
        let now = self.clock.now();
        if now >= available_at {
            return Ok(());
        }
        let wait = FloodWait::until(available_at, now);
        warn!(
            remaining_seconds = wait.remaining_seconds,
            "Retry attempted before the flood wait elapsed"
        );
        self.transition(SessionState::RateLimited(available_at));
        Err(SessionError::RateLimited(wait))
    }

    fn authenticated_account(&self) -> Option<AccountInfo> {
        if self.state().is_authenticated() && self.client.is_connected() {
            self.account.clone()
        } else {
            None
        }
    }

    fn authenticated(&mut self, account: AccountInfo) -> AccountInfo {
        info!("Authenticated as {account}");
        self.account = Some(account.clone());
        self.transition(SessionState::Authenticated);
        account
    }

    fn classify(&self, error: ClientError) -> SessionError {
        match error {
            ClientError::FloodWait { seconds } => {
                let wait = FloodWait::observed(seconds, self.clock.now());
                warn!(
                    seconds,
                    available_at = %wait.available_at,
                    "Flood wait imposed by Telegram"
                );
                SessionError::RateLimited(wait)
            }
            ClientError::InvalidCode => SessionError::Authentication(AuthFailure::InvalidCode),
            ClientError::InvalidPassword => {
                SessionError::Authentication(AuthFailure::InvalidPassword)
            }
            ClientError::SignUpRequired => SessionError::Authentication(AuthFailure::SignUpRequired),
            ClientError::PasswordRequired => {
                SessionError::Authentication(AuthFailure::MissingInput("two-factor password"))
            }
            other => SessionError::Failed(other.to_string()),
        }
    }

    /// Classify `error` and move to the matching terminal state.
    fn fail(&self, error: ClientError) -> SessionError {
        let error = self.classify(error);
        match &error {
            SessionError::RateLimited(wait) => {
                self.transition(SessionState::RateLimited(wait.available_at));
            }
            SessionError::Authentication(failure) => {
                self.transition(SessionState::Failed(failure.to_string()));
            }
            SessionError::Failed(reason) => {
                warn!("Session attempt failed: {reason}");
                self.transition(SessionState::Failed(reason.clone()));
            }
            SessionError::NotAuthenticated | SessionError::Cancelled => {}
        }
        error
    }

    fn fail_auth(&self, failure: AuthFailure) -> SessionError {
        warn!("Authentication failed: {failure}");
        self.transition(SessionState::Failed(failure.to_string()));
        SessionError::Authentication(failure)
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next.clone());
        if previous != next {
            debug!("Session state: {previous} -> {next}");
        }
    }
}
