//! # chatlink Axum Integration
//!
//! HTTP surface of the chatlink relay:
//!
//! - `POST /webhook` (configurable): Telegram `Update` deliveries that drive code issuance
//! - `GET /get-chat-id?codigo=<code>`: resolve a verification code to its chat id
//! - Any other route or method: `200 OK` as a liveness answer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatlink::{ChatLinkBuilder, MemoryNotifier};
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
//!     let app = chatlink_axum::routes(Arc::new(chatlink))
//!         .with_webhook_secret("telegram-secret")
//!         .build();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod middleware;
mod routes;
mod types;

pub use error::{RelayError, Result};
pub use middleware::{RelayState, WEBHOOK_SECRET_HEADER, verify_webhook_secret};
pub use routes::{LOOKUP_PATH, create_router};
pub use types::{Chat, ChatIdResponse, LookupQuery, Message, Update};

use std::sync::Arc;

use axum::Router;
use chatlink::{ChatLink, ExpiringStore, Notifier};

pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";

/// Create the relay routes for a [`ChatLink`] instance.
///
/// The returned builder serves the webhook at [`DEFAULT_WEBHOOK_PATH`] without a secret
/// until configured otherwise.
pub fn routes<S, N>(chatlink: Arc<ChatLink<S, N>>) -> RelayRouterBuilder<S, N>
where
    S: ExpiringStore,
    N: Notifier,
{
    RelayRouterBuilder {
        chatlink,
        webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
        webhook_secret: None,
    }
}

/// Builder for configuring the relay routes
pub struct RelayRouterBuilder<S: ExpiringStore, N: Notifier> {
    chatlink: Arc<ChatLink<S, N>>,
    webhook_path: String,
    webhook_secret: Option<Arc<str>>,
}

impl<S: ExpiringStore, N: Notifier> RelayRouterBuilder<S, N> {
    /// Serve the webhook under `path`. A leading `/` is added when missing.
    ///
    /// The path must not collide with [`LOOKUP_PATH`].
    pub fn with_webhook_path(mut self, path: impl AsRef<str>) -> Self {
        let path = path.as_ref().trim();
        self.webhook_path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    /// Require webhook calls to carry this value in [`WEBHOOK_SECRET_HEADER`].
    /// An empty secret disables the check.
    pub fn with_webhook_secret(mut self, secret: impl AsRef<str>) -> Self {
        let secret = secret.as_ref();
        self.webhook_secret = (!secret.is_empty()).then(|| Arc::from(secret));
        self
    }

    pub fn webhook_path(&self) -> &str {
        &self.webhook_path
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        let state = RelayState {
            chatlink: self.chatlink,
            webhook_secret: self.webhook_secret,
        };
        create_router(state, &self.webhook_path)
    }
}

impl<S: ExpiringStore, N: Notifier> From<RelayRouterBuilder<S, N>> for Router {
    fn from(builder: RelayRouterBuilder<S, N>) -> Self {
        builder.build()
    }
}
