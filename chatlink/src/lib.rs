//! # chatlink
//!
//! chatlink connects a chat on a messaging platform to an external automation. The chat
//! sends `/start <activation code>` to a bot; chatlink answers with a short verification
//! code derived from that activation code, and the automation later trades the
//! verification code for the chat identifier.
//!
//! - Verification codes are `HMAC-SHA256(secret, ACTIVATION CODE)` truncated to 4 bytes
//!   and rendered as 8 uppercase hex characters
//! - Records live for 10 minutes by default and can be read any number of times
//! - Storage is pluggable: in-memory or SQLite
//! - Delivery is pluggable: Telegram Bot API or log-only
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatlink::{ChatId, ChatLinkBuilder, MemoryNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chatlink = ChatLinkBuilder::new()
//!         .with_secret("s3cr3t")
//!         .with_memory_store()
//!         .with_notifier(MemoryNotifier::new())
//!         .build()
//!         .await?;
//!
//!     chatlink.issue(ChatId::from(42), "/start abc123").await?;
//!     let record = chatlink.resolve(Some("f5c79495")).await?;
//!     assert_eq!(record.chat_id, ChatId::from(42));
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use chatlink_core::{IssuerService, ResolverService, VerificationRepository};

pub mod builder;

pub use builder::{ChatLinkBuilder, ChatLinkBuilderError, NoNotifier, NoStore, WithNotifier, WithStore};

pub use chatlink_core::crypto;

/// Re-export core types from chatlink_core
pub use chatlink_core::{
    ActivationCode, ChatId, ChatLinkConfig, DEFAULT_CODE_TTL, Error, ExpiringStore,
    InMemoryStore, IssueOutcome, MemoryNotifier, Notifier, OutboundMessage, VerificationCode,
    VerificationRecord,
};

/// Re-export storage backends
#[cfg(feature = "sqlite")]
pub use chatlink_storage_sqlite::SqliteStore;

/// Re-export notifiers
#[cfg(feature = "telegram")]
pub use chatlink_telegram::{LogNotifier, TelegramClient, TelegramConfig, TelegramError};

/// The relay: issues verification codes for chat events and resolves them back.
///
/// `S` is the backing [`ExpiringStore`] and `N` the [`Notifier`] used to reply to chats.
/// Both services share one repository and one [`ChatLinkConfig`].
pub struct ChatLink<S: ExpiringStore, N: Notifier> {
    config: Arc<ChatLinkConfig>,
    repository: Arc<VerificationRepository<S>>,
    issuer: IssuerService<S, N>,
    resolver: ResolverService<S>,
}

impl<S: ExpiringStore, N: Notifier> ChatLink<S, N> {
    /// Wire a relay from its parts. Prefer [`ChatLinkBuilder`] for anything but tests.
    pub fn new(store: S, notifier: N, config: ChatLinkConfig) -> Self {
        let config = Arc::new(config);
        let repository = Arc::new(VerificationRepository::new(store));
        let notifier = Arc::new(notifier);

        Self {
            issuer: IssuerService::new(repository.clone(), notifier, config.clone()),
            resolver: ResolverService::new(repository.clone()),
            repository,
            config,
        }
    }

    pub fn config(&self) -> &ChatLinkConfig {
        &self.config
    }

    /// Handle an inbound chat message. See [`IssuerService::issue`].
    pub async fn issue(&self, chat_id: ChatId, text: &str) -> Result<IssueOutcome, Error> {
        self.issuer.issue(chat_id, text).await
    }

    /// Resolve a verification code supplied by the automation. See
    /// [`ResolverService::resolve`].
    pub async fn resolve(&self, code: Option<&str>) -> Result<VerificationRecord, Error> {
        self.resolver.resolve(code).await
    }

    /// Verification code for `activation_code` with this relay's secret.
    pub fn derive(&self, activation_code: &str) -> Result<VerificationCode, Error> {
        let activation = ActivationCode::parse(activation_code)?;
        self.issuer.derive(&activation)
    }

    pub async fn purge_expired(&self) -> Result<u64, Error> {
        self.repository.purge_expired().await
    }

    pub async fn migrate(&self) -> Result<(), Error> {
        self.repository.store().migrate().await
    }
}
