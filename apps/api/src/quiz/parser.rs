//! Learning-path extraction from free-form model text.
//!
//! The model reply is untrusted: it may wrap the JSON in prose or code fences,
//! omit fields, or use the wrong types. Each failure mode maps to a fixed
//! `FallbackPolicy`.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::quiz::models::{LearningPathResult, LearningResource, Level, PathModule};

pub const FALLBACK_TITLE: &str = "Ruta Personalizada";
pub const FALLBACK_DESCRIPTION: &str =
    "Ruta de aprendizaje personalizada generada a partir de tus respuestas.";
pub const FALLBACK_LEVEL: Level = Level::Beginner;

const REQUIRED_FIELDS: [&str; 3] = ["title", "description", "level"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoJsonFound,

    #[error("model output contains malformed JSON: {0}")]
    MalformedJson(String),

    #[error("model output is missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<&'static str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Return a record made only of fallback values.
    UseFallbackRecord,
    /// Keep what parsed; fill the missing fields with fallback values.
    FillDefaults,
    /// Surface the failure to the caller.
    Fail,
}

impl ExtractError {
    pub fn policy(&self) -> FallbackPolicy {
        match self {
            ExtractError::NoJsonFound => FallbackPolicy::UseFallbackRecord,
            ExtractError::MissingRequiredFields(_) => FallbackPolicy::FillDefaults,
            ExtractError::MalformedJson(_) => FallbackPolicy::Fail,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedLearningPath {
    pub result: LearningPathResult,
    /// The recoverable extraction problem, if the result is partly made up.
    pub degraded: Option<ExtractError>,
    /// Optional fields the model left out or got wrong.
    pub defaulted: Vec<&'static str>,
}

impl ParsedLearningPath {
    pub fn is_defaulted(&self, field: &str) -> bool {
        self.defaulted.contains(&field)
    }
}

/// Slice from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_learning_path(text: &str) -> Result<ParsedLearningPath, ExtractError> {
    let Some(slice) = extract_json_object(text) else {
        return Ok(fallback_record(ExtractError::NoJsonFound));
    };

    let object: Map<String, Value> = serde_json::from_str(slice)
        .map_err(|e| ExtractError::MalformedJson(e.to_string()))?;

    let title = string_field(&object, "title");
    let description = string_field(&object, "description");
    let level = string_field(&object, "level").and_then(|raw| Level::parse(&raw));

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .zip([title.is_none(), description.is_none(), level.is_none()])
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

    let mut defaulted = Vec::new();
    let estimated_time = match hours_field(&object, "estimatedTime") {
        Some(hours) => hours,
        None => {
            defaulted.push("estimatedTime");
            0
        }
    };

    let mut skills: Vec<String> = Vec::new();
    for skill in string_list(&object, "skills") {
        if !skills.contains(&skill) {
            skills.push(skill);
        }
    }

    let result = LearningPathResult {
        title: title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        description: description.unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
        level: level.unwrap_or(FALLBACK_LEVEL),
        estimated_time,
        difficulty: string_field(&object, "difficulty"),
        interests: interests_field(&object),
        courses: string_list(&object, "courses"),
        skills,
        career_paths: string_list(&object, "careerPaths"),
        modules: modules_field(&object),
    };

    let degraded = (!missing.is_empty()).then(|| ExtractError::MissingRequiredFields(missing));

    Ok(ParsedLearningPath {
        result,
        degraded,
        defaulted,
    })
}

fn fallback_record(reason: ExtractError) -> ParsedLearningPath {
    ParsedLearningPath {
        result: LearningPathResult {
            title: FALLBACK_TITLE.to_string(),
            description: FALLBACK_DESCRIPTION.to_string(),
            level: FALLBACK_LEVEL,
            estimated_time: 0,
            difficulty: None,
            interests: String::new(),
            courses: Vec::new(),
            skills: Vec::new(),
            career_paths: Vec::new(),
            modules: Vec::new(),
        },
        degraded: Some(reason),
        defaulted: vec!["estimatedTime"],
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strings, or objects carrying a `name`/`title`. Anything else is skipped.
fn string_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    let Some(items) = object.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim()),
            Value::Object(o) => o
                .get("name")
                .or_else(|| o.get("title"))
                .and_then(Value::as_str)
                .map(str::trim),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Positive hours from a number or from the leading digits of a string ("120 horas").
fn hours_field(object: &Map<String, Value>, key: &str) -> Option<u32> {
    let hours = match object.get(key)? {
        Value::Number(n) => n.as_f64().map(f64::round)?,
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse::<f64>().ok()?
        }
        _ => return None,
    };
    (1.0..=f64::from(u32::MAX))
        .contains(&hours)
        .then_some(hours as u32)
}

fn interests_field(object: &Map<String, Value>) -> String {
    match object.get("interests") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(_)) => string_list(object, "interests").join(", "),
        _ => String::new(),
    }
}

fn modules_field(object: &Map<String, Value>) -> Vec<PathModule> {
    let Some(items) = object.get("modules").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let Value::Object(module) = item else {
                warn!(index, "Skipping learning-path module that is not an object");
                return None;
            };
            let Some(name) = string_field(module, "name") else {
                warn!(index, "Skipping learning-path module without a name");
                return None;
            };
            let resources = module
                .get("resources")
                .and_then(Value::as_array)
                .map(|rs| {
                    rs.iter()
                        .filter_map(|r| serde_json::from_value::<LearningResource>(r.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            Some(PathModule {
                name,
                duration: string_field(module, "duration").unwrap_or_default(),
                topics: string_list(module, "topics"),
                resources,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_inside_prose_and_fences() {
        let text = "Here you go: ```json\n{\"title\":\"T\",\"description\":\"D\",\"level\":\"beginner\"}\n```";
        let parsed = parse_learning_path(text).unwrap();
        assert_eq!(parsed.result.title, "T");
        assert_eq!(parsed.result.description, "D");
        assert_eq!(parsed.result.level, Level::Beginner);
        assert!(parsed.result.courses.is_empty());
        assert!(parsed.result.skills.is_empty());
        assert!(parsed.result.career_paths.is_empty());
        assert!(parsed.result.modules.is_empty());
        assert!(parsed.degraded.is_none());
        assert!(parsed.is_defaulted("estimatedTime"));
    }

    #[test]
    fn test_no_json_uses_fallback_record() {
        let parsed = parse_learning_path("Lo siento, no puedo ayudar con eso.").unwrap();
        assert_eq!(parsed.result.title, FALLBACK_TITLE);
        assert_eq!(parsed.result.description, FALLBACK_DESCRIPTION);
        assert_eq!(parsed.degraded, Some(ExtractError::NoJsonFound));
        assert_eq!(
            ExtractError::NoJsonFound.policy(),
            FallbackPolicy::UseFallbackRecord
        );
    }

    #[test]
    fn test_reversed_braces_count_as_no_json() {
        let parsed = parse_learning_path("} nothing here {").unwrap();
        assert_eq!(parsed.degraded, Some(ExtractError::NoJsonFound));
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = parse_learning_path("{\"title\": \"T\", }").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedJson(_)));
        assert_eq!(err.policy(), FallbackPolicy::Fail);
    }

    #[test]
    fn test_missing_required_fields_are_filled() {
        let parsed = parse_learning_path(r#"{"title":"Solo título","courses":["Álgebra"]}"#).unwrap();
        assert_eq!(parsed.result.title, "Solo título");
        assert_eq!(parsed.result.description, FALLBACK_DESCRIPTION);
        assert_eq!(parsed.result.level, FALLBACK_LEVEL);
        assert_eq!(parsed.result.courses, vec!["Álgebra"]);
        assert_eq!(
            parsed.degraded,
            Some(ExtractError::MissingRequiredFields(vec!["description", "level"]))
        );
    }

    #[test]
    fn test_unknown_level_counts_as_missing() {
        let parsed =
            parse_learning_path(r#"{"title":"T","description":"D","level":"experto"}"#).unwrap();
        assert_eq!(
            parsed.degraded,
            Some(ExtractError::MissingRequiredFields(vec!["level"]))
        );
    }

    #[test]
    fn test_lenient_field_shapes() {
        let text = r#"{
            "title": "T", "description": "D", "level": "Intermedio",
            "estimatedTime": "80 horas",
            "interests": ["informatica", "matematicas"],
            "skills": ["Lógica", {"name": "Lógica"}, "Análisis", 42],
            "courses": [{"title": "Bases de Datos"}],
            "modules": [
                {"name": "Fundamentos", "duration": "4 semanas", "topics": ["Variables"],
                 "resources": [{"type": "book", "title": "SICP", "author": "Abelson"}]},
                {"duration": "sin nombre"},
                "texto suelto"
            ]
        }"#;
        let parsed = parse_learning_path(text).unwrap();
        let r = parsed.result;
        assert_eq!(r.level, Level::Intermediate);
        assert_eq!(r.estimated_time, 80);
        assert_eq!(r.interests, "informatica, matematicas");
        assert_eq!(r.skills, vec!["Lógica", "Análisis"]);
        assert_eq!(r.courses, vec!["Bases de Datos"]);
        assert_eq!(r.modules.len(), 1);
        assert_eq!(r.modules[0].resources[0].author.as_deref(), Some("Abelson"));
        assert!(parsed.defaulted.is_empty());
    }

    #[test]
    fn test_non_positive_estimated_time_is_defaulted() {
        let parsed = parse_learning_path(
            r#"{"title":"T","description":"D","level":"advanced","estimatedTime":0}"#,
        )
        .unwrap();
        assert!(parsed.is_defaulted("estimatedTime"));
    }

    #[test]
    fn test_two_objects_are_malformed() {
        let err = parse_learning_path(r#"{"title":"A"} y también {"title":"B"}"#).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedJson(_)));
    }
}
