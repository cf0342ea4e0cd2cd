use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatlink_core::Error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Verification code not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    InternalError,
}

impl From<Error> for RelayError {
    fn from(err: Error) -> Self {
        if err.is_not_found() {
            RelayError::NotFound
        } else if err.is_validation_error() {
            RelayError::MissingParameter("codigo")
        } else {
            tracing::error!(error = %err, "Request failed");
            RelayError::InternalError
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
