use media_relay_core::session::{AccountInfo, SessionState};
use tokio::sync::watch;

/// Command and message handlers
pub mod handlers;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// Reply texts
pub mod views;

/// Relay account status shared with the handlers.
#[derive(Debug, Clone)]
pub struct RelayStatus {
    /// Live session state
    pub state: watch::Receiver<SessionState>,
    /// Account the relay session is logged in as
    pub account: Option<AccountInfo>,
}

impl RelayStatus {
    /// Snapshot of the current session state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }
}
