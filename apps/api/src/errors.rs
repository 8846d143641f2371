use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::client::BackendError;
use crate::llm_client::LlmError;
use crate::quiz::validation::FieldErrors;
use crate::quiz::wizard::WizardError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Field-scoped, always recoverable. Rendered inline by the client.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Refresh was attempted once and failed; local session state is gone.
    #[error("Session expired")]
    AuthExpired,

    /// Transient failure talking to an external service. Safe to retry.
    #[error("Network error: {0}")]
    Network(String),

    /// The inference service answered but nothing usable could be extracted.
    #[error("Inference error: {0}")]
    Inference(String),

    /// The backend rejected the request with its own status (bad credentials, etc).
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => AppError::Inference(err.to_string()),
            LlmError::Http(_) | LlmError::Api { .. } | LlmError::RateLimited { .. } => {
                AppError::Network(err.to_string())
            }
        }
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Invalid { errors, .. } => AppError::Validation(errors),
            WizardError::NotAtFinalStep { .. } => AppError::BadRequest(err.to_string()),
            WizardError::SubmissionInFlight => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::AuthExpired => AppError::AuthExpired,
            BackendError::Http(e) => AppError::Network(e.to_string()),
            BackendError::Api { status, message } => AppError::Upstream { status, message },
            BackendError::Store(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Some fields are invalid".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::AuthExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_EXPIRED",
                "Session expired, please sign in again".to_string(),
            ),
            AppError::Network(msg) => {
                tracing::warn!("Network error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "NETWORK_ERROR",
                    "An external service is unavailable, please retry".to_string(),
                )
            }
            AppError::Inference(msg) => {
                tracing::error!("Inference error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INFERENCE_ERROR",
                    "The AI service returned an unusable answer".to_string(),
                )
            }
            AppError::Upstream { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_ERROR",
                message.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::Validation(fields) = &self {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
