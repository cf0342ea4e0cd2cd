//! Telegram delivery for chatlink
//!
//! [`TelegramClient`] implements [`chatlink_core::Notifier`] on top of the Bot API's
//! `sendMessage` method and can register the relay's webhook with `setWebhook`.
//! [`LogNotifier`] is a drop-in replacement that only logs.
pub mod client;
pub mod config;
pub mod error;
pub mod log_notifier;

pub use client::TelegramClient;
pub use config::TelegramConfig;
pub use error::{Result, TelegramError};
pub use log_notifier::LogNotifier;
