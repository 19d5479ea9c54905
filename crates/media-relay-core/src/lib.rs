#![deny(missing_docs)]
//! Media relay core library.
//!
//! Link recognition for Instagram, YouTube and TikTok, relay configuration,
//! and the messaging session lifecycle with flood-wait handling.

/// Configuration management.
pub mod config;
/// Link classification, normalization and extraction.
pub mod links;
/// Messaging session lifecycle.
pub mod session;
