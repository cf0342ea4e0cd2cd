//! Core functionality for the chatlink relay
//!
//! chatlink links a chat on a messaging platform to an external automation by trading a
//! short-lived verification code for the chat identifier:
//!
//! 1. A user sends `/start <activation code>` to the bot.
//! 2. The [`IssuerService`] derives a verification code with a keyed hash, stores
//!    `code -> chat id` with a short expiry and replies with the code.
//! 3. The automation asks the [`ResolverService`] for the chat id behind that code.
//!
//! Storage is abstracted behind [`ExpiringStore`] and outbound delivery behind
//! [`Notifier`]; see the `chatlink-storage-sqlite` and `chatlink-telegram` crates for
//! production implementations.
pub mod command;
pub mod config;
pub mod crypto;
pub mod error;
pub mod messages;
pub mod notifier;
pub mod record;
pub mod repository;
pub mod services;
pub mod store;

pub use config::{ChatLinkConfig, DEFAULT_CODE_TTL, HmacSecret};
pub use error::Error;
pub use notifier::{MemoryNotifier, Notifier, OutboundMessage};
pub use record::{ActivationCode, ChatId, VerificationCode, VerificationRecord};
pub use repository::VerificationRepository;
pub use services::{IssueOutcome, IssuerService, ResolverService};
pub use store::{ExpiringStore, InMemoryStore};
