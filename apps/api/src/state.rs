use std::sync::Arc;

use crate::backend::client::BackendClient;
use crate::llm_client::TextGenerator;
use crate::quiz::history::LearningPathHistory;
use crate::quiz::sessions::QuizSessions;
use crate::recommendations::service::ContentService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gemini in production; a fake in tests.
    pub llm: Arc<dyn TextGenerator>,
    pub sessions: Arc<QuizSessions>,
    /// Learning paths generated since startup, oldest first.
    pub history: Arc<LearningPathHistory>,
    pub content: Arc<ContentService>,
    pub backend: Arc<BackendClient>,
}
