use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::recommendations::synthesizer::CourseSuggestion;
use crate::recommendations::videos::VideoSuggestion;
use crate::state::AppState;

const DEFAULT_COURSE_LIMIT: usize = 8;
const DEFAULT_VIDEO_LIMIT: usize = 4;
const MAX_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, MAX_LIMIT)
    }
}

/// GET /api/v1/recommendations/courses
pub async fn handle_courses(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<CourseSuggestion>> {
    let paths = state.history.list();
    Json(
        state
            .content
            .recommended_courses(&paths, params.or(DEFAULT_COURSE_LIMIT)),
    )
}

/// GET /api/v1/recommendations/videos
pub async fn handle_videos(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<VideoSuggestion>> {
    let paths = state.history.list();
    Json(
        state
            .content
            .continue_studying_videos(&paths, params.or(DEFAULT_VIDEO_LIMIT))
            .await,
    )
}

/// POST /api/v1/recommendations/cache/reset
pub async fn handle_reset_cache(State(state): State<AppState>) -> StatusCode {
    state.content.clear_cache();
    tracing::info!("Recommendation caches cleared");
    StatusCode::NO_CONTENT
}
