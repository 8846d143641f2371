use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single answer: free text / single choice, or a multi-select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Many(Vec<String>),
}

impl AnswerValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Many(items) => items.is_empty(),
        }
    }

    /// Number of selected values. Text counts as one.
    pub fn len(&self) -> usize {
        match self {
            AnswerValue::Text(_) => 1,
            AnswerValue::Many(items) => items.len(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Many(_) => None,
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            AnswerValue::Text(text) => vec![text.as_str()],
            AnswerValue::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Multi-selects behave as sets: duplicates are dropped, first occurrence wins.
    fn normalized(self) -> Self {
        match self {
            AnswerValue::Many(items) => {
                let mut unique: Vec<String> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                AnswerValue::Many(unique)
            }
            text => text,
        }
    }
}

/// Field-key → value mapping shared by the quiz wizard and the account forms.
/// Keys are only ever added or overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, AnswerValue>);

/// Answers accumulated by the quiz wizard.
pub type QuizAnswers = FormValues;

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AnswerValue::as_text)
    }

    /// Values of a field as a list, empty when absent.
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.get(key).map(AnswerValue::values).unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.0.insert(key.into(), value.normalized());
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, AnswerValue::Text(value.into()));
    }

    pub fn set_many<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(
            key,
            AnswerValue::Many(values.into_iter().map(Into::into).collect()),
        );
    }

    /// Overwrites every key present in `patch`; keys absent from it are kept.
    pub fn merge(&mut self, patch: FormValues) {
        for (key, value) in patch.0 {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Accepts the English names and the Spanish labels the model tends to echo back.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "beginner" | "principiante" | "basico" | "básico" => Some(Level::Beginner),
            "intermediate" | "intermedio" => Some(Level::Intermediate),
            "advanced" | "avanzado" => Some(Level::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }

    /// Spanish course-level label used by the content catalog.
    pub fn course_label(&self) -> &'static str {
        match self {
            Level::Beginner => "Básico",
            Level::Intermediate => "Intermedio",
            Level::Advanced => "Avanzado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathModule {
    pub name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub resources: Vec<LearningResource>,
}

/// The structured recommendation produced for one quiz submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathResult {
    pub title: String,
    pub description: String,
    pub level: Level,
    /// Total hours, always positive once the path leaves the pipeline.
    pub estimated_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Comma-separated interests, e.g. "informatica, matematicas".
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub career_paths: Vec<String>,
    #[serde(default)]
    pub modules: Vec<PathModule>,
}

/// A learning path as kept in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub path: LearningPathResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_value_untagged_deserialization() {
        let text: AnswerValue = serde_json::from_str(r#""practico""#).unwrap();
        assert_eq!(text, AnswerValue::Text("practico".to_string()));

        let many: AnswerValue = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_multi_select_drops_duplicates() {
        let mut values = FormValues::new();
        values.set_many("academicInterests", ["fisica", "artes", "fisica"]);
        assert_eq!(values.list("academicInterests"), vec!["fisica", "artes"]);
    }

    #[test]
    fn test_merge_overwrites_and_keeps() {
        let mut values = FormValues::new();
        values.set_text("learningStyle", "practico");
        values.set_text("teamWork", "equipo");

        let mut patch = FormValues::new();
        patch.set_text("teamWork", "individual");
        values.merge(patch);

        assert_eq!(values.text("learningStyle"), Some("practico"));
        assert_eq!(values.text("teamWork"), Some("individual"));
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(AnswerValue::Text("  ".to_string()).is_empty());
        assert!(AnswerValue::Many(vec![]).is_empty());
    }

    #[test]
    fn test_level_parse_accepts_spanish() {
        assert_eq!(Level::parse("Avanzado"), Some(Level::Advanced));
        assert_eq!(Level::parse(" beginner "), Some(Level::Beginner));
        assert_eq!(Level::parse("experto"), None);
    }

    #[test]
    fn test_record_flattens_path_fields() {
        let record = LearningPathRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            path: LearningPathResult {
                title: "Ruta".to_string(),
                description: "Desc".to_string(),
                level: Level::Intermediate,
                estimated_time: 120,
                difficulty: None,
                interests: String::new(),
                courses: vec![],
                skills: vec![],
                career_paths: vec!["Investigador".to_string()],
                modules: vec![],
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "Ruta");
        assert_eq!(json["estimatedTime"], 120);
        assert_eq!(json["careerPaths"][0], "Investigador");
        assert_eq!(json["level"], "intermediate");
    }
}
