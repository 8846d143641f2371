use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::quiz::models::{LearningPathRecord, QuizAnswers};
use crate::quiz::pipeline::submit_wizard;
use crate::quiz::validation::{StepSchema, QUIZ_STEPS};
use crate::quiz::wizard::{Transition, WizardView, TOTAL_STEPS};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsResponse {
    pub total_steps: u8,
    pub steps: &'static [StepSchema],
}

#[derive(Serialize)]
pub struct TransitionResponse {
    pub transition: Transition,
    pub wizard: WizardView,
}

/// GET /api/v1/quiz/steps
pub async fn handle_list_steps() -> Json<StepsResponse> {
    Json(StepsResponse {
        total_steps: TOTAL_STEPS,
        steps: QUIZ_STEPS,
    })
}

/// POST /api/v1/quiz/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<WizardView>) {
    let wizard = state.sessions.create();
    tracing::info!(session = %wizard.id(), "Quiz session started");
    (StatusCode::CREATED, Json(wizard.view()))
}

/// GET /api/v1/quiz/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let view = state.sessions.with_wizard(id, |w| w.view())?;
    Ok(Json(view))
}

/// PATCH /api/v1/quiz/sessions/:id/answers
pub async fn handle_set_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<QuizAnswers>,
) -> Result<Json<WizardView>, AppError> {
    let view = state.sessions.with_wizard(id, |w| {
        w.set_answers(patch)?;
        Ok::<_, AppError>(w.view())
    })??;
    Ok(Json(view))
}

/// POST /api/v1/quiz/sessions/:id/next
pub async fn handle_next(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    let response = state.sessions.with_wizard(id, |w| {
        let transition = w.next()?;
        Ok::<_, AppError>(TransitionResponse {
            transition,
            wizard: w.view(),
        })
    })??;
    Ok(Json(response))
}

/// POST /api/v1/quiz/sessions/:id/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    let response = state.sessions.with_wizard(id, |w| {
        let transition = w.previous()?;
        Ok::<_, AppError>(TransitionResponse {
            transition,
            wizard: w.view(),
        })
    })??;
    Ok(Json(response))
}

/// POST /api/v1/quiz/sessions/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<LearningPathRecord>), AppError> {
    let record = submit_wizard(&state.sessions, state.llm.as_ref(), &state.history, id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/learning-paths
pub async fn handle_list_learning_paths(
    State(state): State<AppState>,
) -> Json<Vec<LearningPathRecord>> {
    Json(state.history.list())
}
