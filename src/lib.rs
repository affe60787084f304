//! Telegram storefront bot backed by the Moltin commerce API.
//!
//! The bot walks a customer through a small conversation: product menu,
//! product card, cart and checkout by email. Conversation state lives in an
//! external key-value store, catalog and cart live in the commerce backend.

/// Telegram-facing conversation driver, views and handlers
pub mod bot;
/// Commerce backend client and models
pub mod commerce;
/// Configuration and settings management
pub mod config;
/// Log output setup and secret redaction
pub mod logging;
/// Session state persistence
pub mod storage;
/// Small text and retry helpers
pub mod utils;
