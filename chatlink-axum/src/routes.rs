use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chatlink::{ExpiringStore, IssueOutcome, Notifier};

use crate::{
    error::{RelayError, Result},
    middleware::{RelayState, verify_webhook_secret},
    types::*,
};

pub const LOOKUP_PATH: &str = "/get-chat-id";

pub fn create_router<S, N>(state: RelayState<S, N>, webhook_path: &str) -> Router
where
    S: ExpiringStore,
    N: Notifier,
{
    // Method mismatches on known paths fall through to the liveness answer as well.
    let webhook = post(webhook_handler::<S, N>)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            verify_webhook_secret::<S, N>,
        ))
        .fallback(fallback_handler);

    Router::new()
        .route(webhook_path, webhook)
        .route(
            LOOKUP_PATH,
            get(lookup_handler::<S, N>).fallback(fallback_handler),
        )
        .fallback(fallback_handler)
        .with_state(state)
}

/// Inbound chat update. The body is decoded by hand so malformed updates are logged and
/// answered with a generic 500 instead of an extractor rejection.
async fn webhook_handler<S, N>(State(state): State<RelayState<S, N>>, body: Bytes) -> Result<StatusCode>
where
    S: ExpiringStore,
    N: Notifier,
{
    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode webhook update");
        RelayError::InternalError
    })?;

    let Some((chat_id, text)) = update.chat_event() else {
        tracing::debug!(update_id = ?update.update_id, "Ignoring update without a text message");
        return Ok(StatusCode::OK);
    };

    match state.chatlink.issue(chat_id, text).await? {
        IssueOutcome::Issued { .. } | IssueOutcome::UsageError => {}
        IssueOutcome::Ignored => {
            tracing::debug!(update_id = ?update.update_id, "Ignoring non-command message");
        }
    }

    Ok(StatusCode::OK)
}

async fn lookup_handler<S, N>(
    State(state): State<RelayState<S, N>>,
    query: std::result::Result<Query<LookupQuery>, QueryRejection>,
) -> Result<Json<ChatIdResponse>>
where
    S: ExpiringStore,
    N: Notifier,
{
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "Rejected lookup query string");
        RelayError::MissingParameter("codigo")
    })?;
    let record = state.chatlink.resolve(query.codigo.as_deref()).await?;

    Ok(Json(ChatIdResponse {
        chat_id: record.chat_id,
        timestamp: record.issued_at.timestamp_millis(),
    }))
}

async fn fallback_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "OK")
}
