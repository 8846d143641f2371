//! Quiz submission pipeline: answers → prompt → one model call → parsed,
//! enriched learning path → history.

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::quiz::enrichment::enrich;
use crate::quiz::history::LearningPathHistory;
use crate::quiz::models::{LearningPathRecord, LearningPathResult, QuizAnswers};
use crate::quiz::parser::parse_learning_path;
use crate::quiz::prompts::{build_learning_path_prompt, RequestToken, LEARNING_PATH_SYSTEM};
use crate::quiz::sessions::QuizSessions;
use crate::quiz::wizard::Wizard;

pub async fn generate_learning_path(
    generator: &dyn TextGenerator,
    answers: &QuizAnswers,
) -> Result<LearningPathResult, AppError> {
    let token = RequestToken::new();
    let prompt = build_learning_path_prompt(answers, &token);

    let text = generator.generate(&prompt, LEARNING_PATH_SYSTEM).await?;

    let parsed = parse_learning_path(&text).map_err(|e| AppError::Inference(e.to_string()))?;
    if let Some(reason) = &parsed.degraded {
        warn!(
            request = %token.id,
            policy = ?reason.policy(),
            "Learning path degraded: {reason}"
        );
    }

    Ok(enrich(parsed, answers))
}

/// Submits the wizard's answers. The wizard is marked in flight for the whole
/// call, so a concurrent submit for the same session fails with a conflict.
pub async fn submit_wizard(
    sessions: &QuizSessions,
    generator: &dyn TextGenerator,
    history: &LearningPathHistory,
    session_id: Uuid,
) -> Result<LearningPathRecord, AppError> {
    let answers = sessions.with_wizard(session_id, |w| w.begin_submission())??;
    let in_flight = InFlight {
        sessions,
        session_id,
    };

    let outcome = generate_learning_path(generator, &answers).await;
    drop(in_flight);

    let path = outcome?;
    let record = history.append(path);
    info!(
        session = %session_id,
        path = %record.id,
        "Learning path generated: {}",
        record.path.title
    );
    Ok(record)
}

/// Releases the wizard's submission flag on drop, so a cancelled request
/// future leaves the wizard usable.
struct InFlight<'a> {
    sessions: &'a QuizSessions,
    session_id: Uuid,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // the session may have been dropped meanwhile; nothing to reset then
        let _ = self
            .sessions
            .with_wizard(self.session_id, Wizard::finish_submission);
    }
}
