use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chatlink::{ChatLink, ExpiringStore, Notifier};
use chatlink_core::crypto::constant_time_compare;

use crate::error::RelayError;

/// Header Telegram sets on webhook calls when `setWebhook` was given a `secret_token`.
pub const WEBHOOK_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub struct RelayState<S: ExpiringStore, N: Notifier> {
    pub chatlink: Arc<ChatLink<S, N>>,
    pub webhook_secret: Option<Arc<str>>,
}

impl<S: ExpiringStore, N: Notifier> Clone for RelayState<S, N> {
    fn clone(&self) -> Self {
        Self {
            chatlink: self.chatlink.clone(),
            webhook_secret: self.webhook_secret.clone(),
        }
    }
}

/// Reject webhook calls that do not carry the configured secret token.
///
/// Passes every request through when no secret is configured.
pub async fn verify_webhook_secret<S, N>(
    State(state): State<RelayState<S, N>>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError>
where
    S: ExpiringStore,
    N: Notifier,
{
    if let Some(expected) = state.webhook_secret.as_deref() {
        let presented = request
            .headers()
            .get(WEBHOOK_SECRET_HEADER)
            .map(|value| value.as_bytes())
            .unwrap_or_default();

        if !constant_time_compare(presented, expected.as_bytes()) {
            tracing::warn!("Rejected webhook call with a missing or wrong secret token");
            return Err(RelayError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}
