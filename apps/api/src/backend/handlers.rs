use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

use crate::backend::forms::{login_credentials, validate_registration};
use crate::errors::AppError;
use crate::quiz::models::FormValues;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Value,
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(form): Json<FormValues>,
) -> Result<Json<SessionResponse>, AppError> {
    let (email, password) = login_credentials(&form).map_err(AppError::Validation)?;
    let user = state.backend.login(email, password).await?;
    tracing::info!("User signed in");
    Ok(Json(SessionResponse {
        authenticated: true,
        user,
    }))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(form): Json<FormValues>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    validate_registration(&form).map_err(AppError::Validation)?;
    let user = state.backend.register(&form).await?;
    tracing::info!("User registered");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            authenticated: true,
            user,
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.backend.logout().await?;
    state.history.clear();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/refresh
pub async fn handle_refresh(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.backend.refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/profile
pub async fn handle_profile(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let user = state.backend.profile().await?;
    Ok(Json(user))
}
