//! Builder pattern for constructing [`ChatLink`] instances
//!
//! The builder tracks at the type level whether a store and a notifier have been
//! configured, so [`ChatLinkBuilder::build`] is only available once both are present.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatlink::{ChatLinkBuilder, TelegramConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chatlink = ChatLinkBuilder::new()
//!         .with_secret("s3cr3t")
//!         .with_sqlite("sqlite://chatlink.db")
//!         .await?
//!         .with_telegram(TelegramConfig::from_env()?)?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use chatlink_core::config::DEFAULT_COMMAND;
use chrono::Duration;

use crate::{ChatLink, ChatLinkConfig, DEFAULT_CODE_TTL, ExpiringStore, InMemoryStore, Notifier};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when building a [`ChatLink`] instance.
#[derive(Debug, thiserror::Error)]
pub enum ChatLinkBuilderError {
    /// Failed to connect to storage backend
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    /// Failed to prepare the storage schema
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Failed to configure the notifier
    #[error("Notifier configuration failed: {0}")]
    NotifierConfiguration(String),
}

// ============================================================================
// Type-State Markers
// ============================================================================

/// Marker type indicating no store has been configured yet.
pub struct NoStore;

/// Marker type indicating a store has been configured.
pub struct WithStore<S: ExpiringStore> {
    store: S,
}

/// Marker type indicating no notifier has been configured yet.
pub struct NoNotifier;

/// Marker type indicating a notifier has been configured.
pub struct WithNotifier<N: Notifier> {
    notifier: N,
}

// ============================================================================
// Builder Implementation
// ============================================================================

/// A type-safe builder for constructing [`ChatLink`] instances.
///
/// # Defaults
///
/// - Code TTL: 10 minutes
/// - Activation commands: `/start`
/// - Apply migrations: false
pub struct ChatLinkBuilder<Store, Notify> {
    store: Store,
    notifier: Notify,
    secret: Option<Vec<u8>>,
    ttl: Duration,
    commands: Vec<String>,
    apply_migrations: bool,
}

impl Default for ChatLinkBuilder<NoStore, NoNotifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatLinkBuilder<NoStore, NoNotifier> {
    pub fn new() -> Self {
        Self {
            store: NoStore,
            notifier: NoNotifier,
            secret: None,
            ttl: DEFAULT_CODE_TTL,
            commands: vec![DEFAULT_COMMAND.to_string()],
            apply_migrations: false,
        }
    }
}

impl<Store, Notify> ChatLinkBuilder<Store, Notify> {
    /// Set the HMAC secret used to derive verification codes. Required.
    pub fn with_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set how long issued codes stay resolvable.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replace the commands that carry an activation code.
    pub fn with_commands<I, C>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Run [`ExpiringStore::migrate`] while building.
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }
}

// ============================================================================
// Storage Configuration Methods (NoStore -> WithStore)
// ============================================================================

impl<Notify> ChatLinkBuilder<NoStore, Notify> {
    /// Use any [`ExpiringStore`] implementation.
    pub fn with_store<S: ExpiringStore>(self, store: S) -> ChatLinkBuilder<WithStore<S>, Notify> {
        ChatLinkBuilder {
            store: WithStore { store },
            notifier: self.notifier,
            secret: self.secret,
            ttl: self.ttl,
            commands: self.commands,
            apply_migrations: self.apply_migrations,
        }
    }

    /// Keep records in process memory. Records are lost on restart.
    pub fn with_memory_store(self) -> ChatLinkBuilder<WithStore<InMemoryStore>, Notify> {
        self.with_store(InMemoryStore::new())
    }
}

#[cfg(feature = "sqlite")]
impl<Notify> ChatLinkBuilder<NoStore, Notify> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite::memory:" or "sqlite://chatlink.db")
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<ChatLinkBuilder<WithStore<crate::SqliteStore>, Notify>, ChatLinkBuilderError> {
        let store = crate::SqliteStore::connect(url)
            .await
            .map_err(|e| ChatLinkBuilderError::StorageConnection(e.to_string()))?;
        Ok(self.with_store(store))
    }
}

// ============================================================================
// Notifier Configuration Methods (NoNotifier -> WithNotifier)
// ============================================================================

impl<Store> ChatLinkBuilder<Store, NoNotifier> {
    /// Use any [`Notifier`] implementation for replies to chats.
    pub fn with_notifier<N: Notifier>(self, notifier: N) -> ChatLinkBuilder<Store, WithNotifier<N>> {
        ChatLinkBuilder {
            store: self.store,
            notifier: WithNotifier { notifier },
            secret: self.secret,
            ttl: self.ttl,
            commands: self.commands,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "telegram")]
impl<Store> ChatLinkBuilder<Store, NoNotifier> {
    /// Reply through the Telegram Bot API.
    pub fn with_telegram(
        self,
        config: crate::TelegramConfig,
    ) -> Result<ChatLinkBuilder<Store, WithNotifier<crate::TelegramClient>>, ChatLinkBuilderError>
    {
        let client = crate::TelegramClient::new(config)
            .map_err(|e| ChatLinkBuilderError::NotifierConfiguration(e.to_string()))?;
        Ok(self.with_notifier(client))
    }

    /// Only log replies instead of delivering them.
    pub fn with_log_notifier(self) -> ChatLinkBuilder<Store, WithNotifier<crate::LogNotifier>> {
        self.with_notifier(crate::LogNotifier::new())
    }
}

// ============================================================================
// Build
// ============================================================================

impl<S: ExpiringStore, N: Notifier> ChatLinkBuilder<WithStore<S>, WithNotifier<N>> {
    /// Validate the configuration and assemble the relay.
    ///
    /// # Errors
    ///
    /// * [`ChatLinkBuilderError::InvalidConfiguration`] when the secret is missing or empty,
    ///   the TTL is not positive or no command is configured
    /// * [`ChatLinkBuilderError::Migration`] when migrations were requested and failed
    pub async fn build(self) -> Result<ChatLink<S, N>, ChatLinkBuilderError> {
        let secret = self.secret.ok_or_else(|| {
            ChatLinkBuilderError::InvalidConfiguration("HMAC secret is required".to_string())
        })?;

        let config = ChatLinkConfig::new(secret)
            .and_then(|config| config.with_ttl(self.ttl))
            .and_then(|config| config.with_commands(self.commands))
            .map_err(|e| ChatLinkBuilderError::InvalidConfiguration(e.to_string()))?;

        let chatlink = ChatLink::new(self.store.store, self.notifier.notifier, config);

        if self.apply_migrations {
            chatlink
                .migrate()
                .await
                .map_err(|e| ChatLinkBuilderError::Migration(e.to_string()))?;
        }

        tracing::debug!(
            ttl_seconds = chatlink.config().ttl().num_seconds(),
            commands = ?chatlink.config().commands(),
            "chatlink relay configured"
        );

        Ok(chatlink)
    }
}
