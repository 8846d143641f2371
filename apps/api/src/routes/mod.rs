pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::backend::handlers as auth;
use crate::chat::handlers as chat;
use crate::quiz::handlers as quiz;
use crate::recommendations::handlers as recommendations;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Vocational quiz
        .route("/api/v1/quiz/steps", get(quiz::handle_list_steps))
        .route("/api/v1/quiz/sessions", post(quiz::handle_create_session))
        .route("/api/v1/quiz/sessions/:id", get(quiz::handle_get_session))
        .route(
            "/api/v1/quiz/sessions/:id/answers",
            patch(quiz::handle_set_answers),
        )
        .route("/api/v1/quiz/sessions/:id/next", post(quiz::handle_next))
        .route(
            "/api/v1/quiz/sessions/:id/previous",
            post(quiz::handle_previous),
        )
        .route("/api/v1/quiz/sessions/:id/submit", post(quiz::handle_submit))
        .route(
            "/api/v1/learning-paths",
            get(quiz::handle_list_learning_paths),
        )
        // Recommendations
        .route(
            "/api/v1/recommendations/courses",
            get(recommendations::handle_courses),
        )
        .route(
            "/api/v1/recommendations/videos",
            get(recommendations::handle_videos),
        )
        .route(
            "/api/v1/recommendations/cache/reset",
            post(recommendations::handle_reset_cache),
        )
        // Study assistant
        .route("/api/v1/chat", post(chat::handle_chat))
        // Backend session
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/refresh", post(auth::handle_refresh))
        .route("/api/v1/auth/profile", get(auth::handle_profile))
        .with_state(state)
}
