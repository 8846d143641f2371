use axum::{extract::State, Json};

use crate::chat::{reply, ChatReply, ChatRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = reply(state.llm.as_ref(), &req).await?;
    Ok(Json(reply))
}
