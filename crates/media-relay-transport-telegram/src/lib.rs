#![deny(missing_docs)]
//! Telegram transport adapter for the media relay.

/// Bot API front-end.
pub mod bot;
/// MTProto client backing the relay account session.
pub mod mtproto;
/// Telegram runtime entrypoint.
pub mod runner;
