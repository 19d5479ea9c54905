#![deny(missing_docs)]
//! Process entry points for the media relay.
//!
//! Shared pieces of the relay bot and the diagnostic binaries: redacted
//! logging setup and operator-facing console output.

/// Operator prompts and status output.
pub mod console;
/// Logging setup with secret redaction.
pub mod logging;
