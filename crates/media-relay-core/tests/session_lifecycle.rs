use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use media_relay_core::config::LoginInputs;
use media_relay_core::session::{
    AccountInfo, AuthFailure, ClientError, ManualClock, MessengerClient, ProbeReport,
    SessionError, SessionManager, SessionState,
};
use std::sync::Arc;
use std::time::Duration;

const CODE: &str = "24680";

/// Scripted provider with a real notion of an open connection.
#[derive(Default)]
struct FakeClient {
    connected: bool,
    authorized: bool,
    flood_on_connect: Option<u64>,
    flood_on_sign_in: Option<u64>,
    authorization_error: Option<String>,
    hang_on_authorization: bool,
    password: Option<String>,
    connects: usize,
    disconnects: usize,
    sign_ins: usize,
}

impl FakeClient {
    fn me() -> AccountInfo {
        AccountInfo {
            id: 7,
            first_name: "Relay".to_string(),
            username: None,
        }
    }
}

#[async_trait]
impl MessengerClient for FakeClient {
    async fn connect(&mut self) -> Result<(), ClientError> {
        self.connects += 1;
        if let Some(seconds) = self.flood_on_connect.take() {
            return Err(ClientError::FloodWait { seconds });
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn is_authorized(&mut self) -> Result<bool, ClientError> {
        if self.hang_on_authorization {
            std::future::pending::<()>().await;
        }
        if let Some(message) = self.authorization_error.take() {
            return Err(ClientError::Other(message));
        }
        Ok(self.authorized)
    }

    async fn request_login_code(&mut self, _phone: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn sign_in(&mut self, code: &str) -> Result<AccountInfo, ClientError> {
        self.sign_ins += 1;
        if let Some(seconds) = self.flood_on_sign_in.take() {
            return Err(ClientError::FloodWait { seconds });
        }
        if code != CODE {
            return Err(ClientError::InvalidCode);
        }
        if self.password.is_some() {
            return Err(ClientError::PasswordRequired);
        }
        self.authorized = true;
        Ok(Self::me())
    }

    async fn check_password(&mut self, password: &str) -> Result<AccountInfo, ClientError> {
        if self.password.as_deref() != Some(password) {
            return Err(ClientError::InvalidPassword);
        }
        self.authorized = true;
        Ok(Self::me())
    }

    async fn get_me(&mut self) -> Result<AccountInfo, ClientError> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        Ok(Self::me())
    }

    async fn disconnect(&mut self) -> Result<(), ClientError> {
        self.disconnects += 1;
        self.connected = false;
        Ok(())
    }
}

fn observed_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_171_717, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn session_with(client: FakeClient) -> (SessionManager<FakeClient>, ManualClock) {
    let clock = ManualClock::new(observed_at());
    let session = SessionManager::with_clock(client, Arc::new(clock.clone()));
    (session, clock)
}

fn valid_inputs() -> LoginInputs {
    LoginInputs {
        phone: Some("+15550001111".to_string()),
        code: Some(CODE.to_string()),
        password: None,
    }
}

#[tokio::test]
async fn probe_releases_connection_when_ready() {
    let (mut session, _) = session_with(FakeClient {
        authorized: true,
        ..FakeClient::default()
    });

    let report = session.probe().await;

    assert_eq!(
        report,
        ProbeReport::Ready {
            account: Some(FakeClient::me())
        }
    );
    assert!(!session.is_connected());
    assert_eq!(session.client().disconnects, 1);
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn probe_reports_throttling_without_blocking() {
    let (mut session, _) = session_with(FakeClient {
        flood_on_connect: Some(3725),
        ..FakeClient::default()
    });

    let ProbeReport::RateLimited(wait) = session.probe().await else {
        panic!("expected a flood wait report");
    };

    assert_eq!(wait.remaining_seconds, 3725);
    assert_eq!(wait.available_at, observed_at() + TimeDelta::seconds(3725));
    assert_eq!(wait.breakdown().to_string(), "1h 2m 5s");
    assert!(!session.is_connected());
}

#[tokio::test]
async fn probe_releases_connection_on_failure() {
    let (mut session, _) = session_with(FakeClient {
        authorization_error: Some("auth key unregistered".to_string()),
        ..FakeClient::default()
    });

    let report = session.probe().await;

    assert_eq!(report, ProbeReport::Failed("auth key unregistered".to_string()));
    assert!(!session.is_connected());
    assert_eq!(session.client().disconnects, 1);
    assert_eq!(
        session.state(),
        SessionState::Failed("auth key unregistered".to_string())
    );
}

#[tokio::test]
async fn probe_releases_connection_when_interrupted() {
    let (mut session, _) = session_with(FakeClient {
        hang_on_authorization: true,
        ..FakeClient::default()
    });
    let token = session.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let report = session.probe().await;

    assert_eq!(report, ProbeReport::Interrupted);
    assert_eq!(session.client().connects, 1);
    assert_eq!(session.client().disconnects, 1);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn cancelled_login_tears_down_before_returning() {
    let (mut session, _) = session_with(FakeClient {
        hang_on_authorization: true,
        ..FakeClient::default()
    });
    let token = session.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let result = session.authenticate_interactive(&valid_inputs()).await;

    assert_eq!(result, Err(SessionError::Cancelled));
    assert!(!session.is_connected());
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn retry_before_available_at_never_authenticates() {
    let (mut session, clock) = session_with(FakeClient {
        flood_on_sign_in: Some(120),
        ..FakeClient::default()
    });
    let inputs = valid_inputs();

    let Err(SessionError::RateLimited(first)) = session.authenticate_interactive(&inputs).await
    else {
        panic!("first attempt should be throttled");
    };
    assert!(!session.is_connected());

    for elapsed in [1, 60, 119] {
        clock.set(observed_at() + TimeDelta::seconds(elapsed));
        let Err(SessionError::RateLimited(wait)) = session.authenticate_interactive(&inputs).await
        else {
            panic!("retry after {elapsed}s must stay throttled");
        };
        assert_eq!(wait.available_at, first.available_at);
        assert_eq!(wait.remaining_seconds, 120 - elapsed.unsigned_abs());
        assert_eq!(session.state(), SessionState::RateLimited(first.available_at));
    }
    assert_eq!(session.client().sign_ins, 1);

    clock.set(first.available_at);
    let account = session.authenticate_interactive(&inputs).await;
    assert_eq!(account, Ok(FakeClient::me()));
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(session.client().sign_ins, 2);
}

#[tokio::test]
async fn interactive_login_with_second_factor() {
    let (mut session, _) = session_with(FakeClient {
        password: Some("correct horse".to_string()),
        ..FakeClient::default()
    });
    let mut inputs = valid_inputs();

    let result = session.authenticate_interactive(&inputs).await;
    assert_eq!(
        result,
        Err(SessionError::Authentication(AuthFailure::MissingInput(
            "two-factor password"
        )))
    );
    assert!(!session.is_connected());

    inputs.password = Some("correct horse".to_string());
    assert_eq!(
        session.authenticate_interactive(&inputs).await,
        Ok(FakeClient::me())
    );
    assert_eq!(session.test_connection().await, Ok(FakeClient::me()));

    session.stop().await;
    session.stop().await;
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(session.client().disconnects, 2);
}

#[tokio::test]
async fn start_requires_an_authorized_session() {
    let (mut session, _) = session_with(FakeClient::default());

    assert_eq!(
        session.start().await,
        Err(SessionError::Authentication(AuthFailure::NotAuthorized))
    );
    assert!(!session.is_connected());
    assert_eq!(
        session.test_connection().await,
        Err(SessionError::NotAuthenticated)
    );
}

#[tokio::test]
async fn subscribers_observe_transitions() {
    let (mut session, _) = session_with(FakeClient {
        authorized: true,
        ..FakeClient::default()
    });
    let mut states = session.subscribe();
    assert_eq!(*states.borrow_and_update(), SessionState::Unauthenticated);

    assert!(session.start().await.is_ok());
    assert!(states.has_changed().unwrap_or(false));
    assert_eq!(*states.borrow_and_update(), SessionState::Authenticated);

    session.stop().await;
    assert_eq!(*states.borrow(), SessionState::Disconnected);
}
