//! Session lifecycle and flood-wait resilience.
//!
//! [`SessionManager`] owns the single messaging-client connection of the
//! process and drives it through authentication, provider throttling and
//! teardown. Callers observe [`SessionState`] but never set it.
//!
//! ```text
//! Unauthenticated ──start──▶ Authenticating ──ok──▶ Authenticated ──stop──▶ Disconnected
//!                                 │  ▲
//!                      flood wait │  │ retry at/after available_at
//!                                 ▼  │
//!                        RateLimited(available_at)
//!                                 │
//!                      other error└──────────▶ Failed(reason)
//! ```

pub mod client;
pub mod clock;
pub mod flood;
mod manager;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

pub use client::{AccountInfo, ClientError, CredentialSource, MessengerClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use flood::{FloodWait, WaitBreakdown};
pub use manager::{AuthFailure, ProbeReport, SessionError, SessionManager};

/// Lifecycle state of the messaging session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Nothing attempted yet
    Unauthenticated,
    /// An authentication attempt is in flight
    Authenticating,
    /// Logged in and usable
    Authenticated,
    /// Throttled by the provider until the given moment
    RateLimited(DateTime<Utc>),
    /// Connection released after being authenticated
    Disconnected,
    /// Last attempt failed for the given reason
    Failed(String),
}

impl SessionState {
    /// Returns `true` for [`SessionState::Authenticated`].
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("unauthenticated"),
            Self::Authenticating => f.write_str("authenticating"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::RateLimited(at) => write!(f, "rate limited until {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
