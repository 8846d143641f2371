//! Prompt Builder: turns finished quiz answers into the learning-path prompt.
//!
//! Pure given the `RequestToken`: the same answers and token always produce the
//! same text. A fresh token per submission keeps identical answers from
//! producing identical requests.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::llm_client::prompts::{EDUCATION_EXPERT_SYSTEM, JSON_ONLY_INSTRUCTION};
use crate::quiz::catalog::{
    label_for, question, QUESTIONS, ACADEMIC_INTERESTS, LEARNING_STYLE, TIME_COMMITMENT,
};
use crate::quiz::models::{Level, QuizAnswers};

/// System prompt for learning-path generation.
pub const LEARNING_PATH_SYSTEM: &str = EDUCATION_EXPERT_SYSTEM;

/// Learning-path prompt template.
/// Replace: {level}, {interests}, {weekly_time}, {profile}, {other_answers},
///          {request_token}, {json_instruction}
pub const LEARNING_PATH_PROMPT_TEMPLATE: &str = r#"Dado este perfil de usuario (nivel: {level}, intereses: {interests}, tiempo disponible: {weekly_time}), genera una ruta de estudio personalizada.

PERFIL COMPLETO:
{profile}
{other_answers}
Identificador de solicitud: {request_token}

Devuelve un objeto JSON con este esquema EXACTO:
{
  "title": "...",
  "description": "...",
  "level": "beginner | intermediate | advanced",
  "estimatedTime": 120,
  "difficulty": "Principiante | Intermedio | Avanzado",
  "interests": "...",
  "courses": ["..."],
  "skills": ["..."],
  "careerPaths": ["..."],
  "modules": [
    {
      "name": "...",
      "duration": "...",
      "topics": ["...", "..."],
      "resources": [
        {"type": "book", "title": "...", "author": "..."},
        {"type": "course", "title": "...", "platform": "..."}
      ]
    }
  ]
}

{json_instruction}"#;

const NOT_AVAILABLE: &str = "N/A";

/// Per-submission uniqueness marker embedded in the prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub id: Uuid,
    pub issued_at: DateTime<Utc>,
}

impl RequestToken {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}@{}",
            self.id,
            self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

impl Default for RequestToken {
    fn default() -> Self {
        Self::new()
    }
}

pub fn level_for_learning_style(style: Option<&str>) -> Level {
    match style {
        Some("muy_practico") | Some("practico") => Level::Beginner,
        Some("equilibrado") => Level::Intermediate,
        _ => Level::Advanced,
    }
}

pub fn weekly_time_phrase(commitment: Option<&str>) -> &'static str {
    match commitment {
        Some("1-2_horas") => "2h/semana",
        Some("3-5_horas") => "5h/semana",
        Some("6-10_horas") => "10h/semana",
        Some("mas_10_horas") => "+10h/semana",
        _ => NOT_AVAILABLE,
    }
}

/// `Label (code)` for known codes, the bare code otherwise.
fn describe(key: &str, code: &str) -> String {
    match question(key).and_then(|q| label_for(q.choices, code)) {
        Some(label) => format!("{label} ({code})"),
        None => code.to_string(),
    }
}

fn describe_all(answers: &QuizAnswers, key: &str) -> Option<String> {
    let values: Vec<String> = answers
        .list(key)
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| describe(key, v))
        .collect();
    (!values.is_empty()).then(|| values.join(", "))
}

pub fn build_learning_path_prompt(answers: &QuizAnswers, token: &RequestToken) -> String {
    let level = level_for_learning_style(answers.text(LEARNING_STYLE));
    let interests = describe_all(answers, ACADEMIC_INTERESTS)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let weekly_time = weekly_time_phrase(answers.text(TIME_COMMITMENT));

    let profile: String = QUESTIONS
        .iter()
        .map(|q| {
            let rendered = describe_all(answers, q.key).unwrap_or_else(|| NOT_AVAILABLE.to_string());
            format!("- {}: {}\n", q.label, rendered)
        })
        .collect();

    let other: Vec<String> = answers
        .iter()
        .filter(|(key, _)| question(key).is_none())
        .filter_map(|(key, _)| describe_all(answers, key).map(|v| format!("- {key}: {v}")))
        .collect();
    let other_answers = if other.is_empty() {
        String::new()
    } else {
        format!("\nOTRAS RESPUESTAS:\n{}\n", other.join("\n"))
    };

    LEARNING_PATH_PROMPT_TEMPLATE
        .replace("{level}", level.as_str())
        .replace("{interests}", &interests)
        .replace("{weekly_time}", weekly_time)
        .replace("{profile}", &profile)
        .replace("{other_answers}", &other_answers)
        .replace("{request_token}", &token.render())
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::*;

    fn answers() -> QuizAnswers {
        let mut a = QuizAnswers::new();
        a.set_many(ACADEMIC_INTERESTS, ["informatica", "matematicas"]);
        a.set_text(LEARNING_STYLE, "practico");
        a.set_text(TEAM_WORK, "equipo");
        a.set_many(PREFERRED_ACTIVITIES, ["programacion"]);
        a.set_many(RESOURCE_PREFERENCES, ["videos"]);
        a.set_many(VOCATIONAL_AREAS, ["informatica"]);
        a.set_text(STUDY_EXPECTATION, "autodidacta");
        a.set_text(TIME_COMMITMENT, "3-5_horas");
        a
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_for_learning_style(Some("muy_practico")), Level::Beginner);
        assert_eq!(level_for_learning_style(Some("practico")), Level::Beginner);
        assert_eq!(level_for_learning_style(Some("equilibrado")), Level::Intermediate);
        assert_eq!(level_for_learning_style(Some("teorico")), Level::Advanced);
        assert_eq!(level_for_learning_style(None), Level::Advanced);
    }

    #[test]
    fn test_weekly_time_mapping() {
        assert_eq!(weekly_time_phrase(Some("1-2_horas")), "2h/semana");
        assert_eq!(weekly_time_phrase(Some("mas_10_horas")), "+10h/semana");
        assert_eq!(weekly_time_phrase(Some("siempre")), "N/A");
    }

    #[test]
    fn test_prompt_contains_labels_and_codes() {
        let prompt = build_learning_path_prompt(&answers(), &RequestToken::new());
        assert!(prompt.contains("nivel: beginner"));
        assert!(prompt.contains("Informática (informatica)"));
        assert!(prompt.contains("Programación (programacion)"));
        assert!(prompt.contains("tiempo disponible: 5h/semana"));
        assert!(prompt.contains("Prefiero aprendizaje autodidacta (autodidacta)"));
        assert!(prompt.contains("\"careerPaths\""));
    }

    #[test]
    fn test_prompt_is_pure_given_token() {
        let token = RequestToken::new();
        let a = build_learning_path_prompt(&answers(), &token);
        let b = build_learning_path_prompt(&answers(), &token);
        assert_eq!(a, b);
        assert!(a.contains(&token.id.to_string()));
    }

    #[test]
    fn test_distinct_tokens_give_distinct_prompts() {
        let a = build_learning_path_prompt(&answers(), &RequestToken::new());
        let b = build_learning_path_prompt(&answers(), &RequestToken::new());
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_keys_are_not_dropped() {
        let mut a = answers();
        a.set_text("favouriteBook", "Rayuela");
        let prompt = build_learning_path_prompt(&a, &RequestToken::new());
        assert!(prompt.contains("OTRAS RESPUESTAS"));
        assert!(prompt.contains("- favouriteBook: Rayuela"));
    }

    #[test]
    fn test_missing_answers_render_placeholder() {
        let prompt = build_learning_path_prompt(&QuizAnswers::new(), &RequestToken::new());
        assert!(prompt.contains("intereses: N/A"));
        assert!(prompt.contains("tiempo disponible: N/A"));
        assert!(!prompt.contains("OTRAS RESPUESTAS"));
    }
}
