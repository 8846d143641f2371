//! Declarative field validation for quiz steps and account forms.
//!
//! `validate_fields` is pure and total: it never panics and always returns
//! either `Ok(())` or every failing field with its first failing message.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::quiz::catalog::{
    self, Choice, ACADEMIC_INTERESTS, LEARNING_STYLE, PREFERRED_ACTIVITIES,
    RESOURCE_PREFERENCES, STUDY_EXPECTATION, TEAM_WORK, TIME_COMMITMENT, VOCATIONAL_AREAS,
};
use crate::quiz::models::{AnswerValue, FormValues};

/// field-key → human-readable message
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Present and non-empty.
    Required { message: &'static str },
    /// Every provided value belongs to the option set.
    OneOf {
        choices: &'static [Choice],
        message: &'static str,
    },
    /// `min <= |values| <= max`.
    Cardinality {
        min: usize,
        max: Option<usize>,
        message: &'static str,
    },
    MinLength { min: usize, message: &'static str },
    Email { message: &'static str },
    /// Equal to the value of another field of the same form.
    Matches {
        field: &'static str,
        message: &'static str,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub rules: &'static [Rule],
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepSchema {
    pub step: u8,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

impl StepSchema {
    pub fn validate(&self, values: &FormValues) -> Result<(), FieldErrors> {
        validate_fields(self.fields, values)
    }
}

pub const QUIZ_STEPS: &[StepSchema] = &[
    StepSchema {
        step: 1,
        title: "Intereses académicos",
        fields: &[FieldSpec {
            key: ACADEMIC_INTERESTS,
            label: "Materias de interés",
            rules: &[
                Rule::Required {
                    message: "Este campo es obligatorio",
                },
                Rule::OneOf {
                    choices: catalog::ACADEMIC_SUBJECTS,
                    message: "Selecciona materias de la lista",
                },
                Rule::Cardinality {
                    min: 1,
                    max: None,
                    message: "Selecciona al menos una materia",
                },
            ],
        }],
    },
    StepSchema {
        step: 2,
        title: "Estilo de aprendizaje",
        fields: &[
            FieldSpec {
                key: LEARNING_STYLE,
                label: "Estilo de aprendizaje",
                rules: &[
                    Rule::Required {
                        message: "Selecciona tu estilo de aprendizaje",
                    },
                    Rule::OneOf {
                        choices: catalog::LEARNING_STYLES,
                        message: "Estilo de aprendizaje no válido",
                    },
                ],
            },
            FieldSpec {
                key: TEAM_WORK,
                label: "Preferencia de trabajo",
                rules: &[
                    Rule::Required {
                        message: "Selecciona tu preferencia de trabajo",
                    },
                    Rule::OneOf {
                        choices: catalog::TEAM_WORK_OPTIONS,
                        message: "Preferencia de trabajo no válida",
                    },
                ],
            },
            FieldSpec {
                key: PREFERRED_ACTIVITIES,
                label: "Actividades preferidas",
                rules: &[
                    Rule::Required {
                        message: "Este campo es obligatorio",
                    },
                    Rule::OneOf {
                        choices: catalog::ACTIVITIES,
                        message: "Selecciona actividades de la lista",
                    },
                    Rule::Cardinality {
                        min: 1,
                        max: None,
                        message: "Selecciona al menos una actividad",
                    },
                ],
            },
        ],
    },
    StepSchema {
        step: 3,
        title: "Recursos de aprendizaje",
        fields: &[FieldSpec {
            key: RESOURCE_PREFERENCES,
            label: "Recursos preferidos",
            rules: &[
                Rule::Required {
                    message: "Este campo es obligatorio",
                },
                Rule::OneOf {
                    choices: catalog::RESOURCE_TYPES,
                    message: "Selecciona recursos de la lista",
                },
                Rule::Cardinality {
                    min: 1,
                    max: None,
                    message: "Selecciona al menos un tipo de recurso",
                },
            ],
        }],
    },
    StepSchema {
        step: 4,
        title: "Áreas vocacionales",
        fields: &[FieldSpec {
            key: VOCATIONAL_AREAS,
            label: "Áreas vocacionales",
            rules: &[
                Rule::Required {
                    message: "Este campo es obligatorio",
                },
                Rule::OneOf {
                    choices: catalog::AREAS,
                    message: "Selecciona áreas de la lista",
                },
                Rule::Cardinality {
                    min: 1,
                    max: Some(3),
                    message: "Selecciona entre 1 y 3 áreas",
                },
            ],
        }],
    },
    StepSchema {
        step: 5,
        title: "Expectativas y tiempo",
        fields: &[
            FieldSpec {
                key: STUDY_EXPECTATION,
                label: "Expectativa de estudio",
                rules: &[
                    Rule::Required {
                        message: "Selecciona tu expectativa de estudio",
                    },
                    Rule::OneOf {
                        choices: catalog::STUDY_EXPECTATIONS,
                        message: "Expectativa de estudio no válida",
                    },
                ],
            },
            FieldSpec {
                key: TIME_COMMITMENT,
                label: "Tiempo disponible",
                rules: &[
                    Rule::Required {
                        message: "Selecciona tu disponibilidad de tiempo",
                    },
                    Rule::OneOf {
                        choices: catalog::TIME_COMMITMENTS,
                        message: "Disponibilidad de tiempo no válida",
                    },
                ],
            },
        ],
    },
];

/// Schema for a 1-based step index. `None` outside `1..=QUIZ_STEPS.len()`.
pub fn step_schema(step: u8) -> Option<&'static StepSchema> {
    QUIZ_STEPS.iter().find(|s| s.step == step)
}

pub fn validate_fields(fields: &[FieldSpec], values: &FormValues) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for field in fields {
        let value = values.get(field.key);
        if let Some(message) = field
            .rules
            .iter()
            .find_map(|rule| check_rule(rule, value, values))
        {
            errors.insert(field.key.to_string(), message.to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Returns the rule's message when it fails.
fn check_rule(
    rule: &Rule,
    value: Option<&AnswerValue>,
    values: &FormValues,
) -> Option<&'static str> {
    if let Rule::Required { message } = rule {
        return match value {
            Some(v) if !v.is_empty() => None,
            _ => Some(*message),
        };
    }

    // Optional rules only judge values that are present.
    let value = value?;

    let failed = match rule {
        Rule::Required { .. } => false,
        Rule::OneOf { choices, .. } => value
            .values()
            .iter()
            .any(|v| !v.trim().is_empty() && !choices.iter().any(|c| c.id == *v)),
        Rule::Cardinality { min, max, .. } => {
            let count = if value.is_empty() { 0 } else { value.len() };
            count < *min || max.is_some_and(|max| count > max)
        }
        Rule::MinLength { min, .. } => value
            .as_text()
            .is_some_and(|t| !t.is_empty() && t.chars().count() < *min),
        Rule::Email { .. } => value
            .as_text()
            .is_some_and(|t| !t.trim().is_empty() && !is_email(t.trim())),
        Rule::Matches { field, .. } => value.as_text() != values.text(field),
    };

    failed.then(|| rule_message(rule))
}

fn rule_message(rule: &Rule) -> &'static str {
    match rule {
        Rule::Required { message }
        | Rule::OneOf { message, .. }
        | Rule::Cardinality { message, .. }
        | Rule::MinLength { message, .. }
        | Rule::Email { message }
        | Rule::Matches { message, .. } => *message,
    }
}

/// Shape check only: `local@domain.tld`, no whitespace.
fn is_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !text.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_answers() -> FormValues {
        let mut a = FormValues::new();
        a.set_many(ACADEMIC_INTERESTS, ["informatica"]);
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
    fn test_every_step_passes_with_complete_answers() {
        let answers = complete_answers();
        for schema in QUIZ_STEPS {
            assert!(schema.validate(&answers).is_ok(), "step {}", schema.step);
        }
    }

    #[test]
    fn test_missing_required_field_reports_message() {
        let errors = step_schema(2).unwrap().validate(&FormValues::new()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[LEARNING_STYLE], "Selecciona tu estilo de aprendizaje");
    }

    #[test]
    fn test_empty_multi_select_fails_required() {
        let mut answers = FormValues::new();
        answers.set_many(ACADEMIC_INTERESTS, Vec::<String>::new());
        let errors = step_schema(1).unwrap().validate(&answers).unwrap_err();
        assert_eq!(errors[ACADEMIC_INTERESTS], "Este campo es obligatorio");
    }

    #[test]
    fn test_vocational_areas_upper_bound() {
        let mut answers = FormValues::new();
        answers.set_many(
            VOCATIONAL_AREAS,
            ["informatica", "ingenieria", "educacion", "salud_medicina"],
        );
        let errors = step_schema(4).unwrap().validate(&answers).unwrap_err();
        assert_eq!(errors[VOCATIONAL_AREAS], "Selecciona entre 1 y 3 áreas");
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut answers = complete_answers();
        answers.set_text(TIME_COMMITMENT, "todo_el_dia");
        let errors = step_schema(5).unwrap().validate(&answers).unwrap_err();
        assert!(errors.contains_key(TIME_COMMITMENT));
        assert!(!errors.contains_key(STUDY_EXPECTATION));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let mut answers = complete_answers();
        answers.set_many(VOCATIONAL_AREAS, Vec::<String>::new());
        let schema = step_schema(4).unwrap();
        assert_eq!(schema.validate(&answers), schema.validate(&answers));
    }

    #[test]
    fn test_step_schema_out_of_range() {
        assert!(step_schema(0).is_none());
        assert!(step_schema(6).is_none());
    }

    const PASSWORD_FIELDS: &[FieldSpec] = &[
        FieldSpec {
            key: "password",
            label: "Contraseña",
            rules: &[Rule::MinLength {
                min: 8,
                message: "too short",
            }],
        },
        FieldSpec {
            key: "password_confirm",
            label: "Confirmación",
            rules: &[
                Rule::Required { message: "required" },
                Rule::Matches {
                    field: "password",
                    message: "mismatch",
                },
            ],
        },
    ];

    #[test]
    fn test_cross_field_equality() {
        let mut values = FormValues::new();
        values.set_text("password", "supersecreta");
        values.set_text("password_confirm", "otracosa1");
        let errors = validate_fields(PASSWORD_FIELDS, &values).unwrap_err();
        assert_eq!(errors["password_confirm"], "mismatch");

        values.set_text("password_confirm", "supersecreta");
        assert!(validate_fields(PASSWORD_FIELDS, &values).is_ok());
    }

    #[test]
    fn test_min_length() {
        let mut values = FormValues::new();
        values.set_text("password", "corta");
        values.set_text("password_confirm", "corta");
        let errors = validate_fields(PASSWORD_FIELDS, &values).unwrap_err();
        assert_eq!(errors["password"], "too short");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email("ana@example.com"));
        assert!(!is_email("ana@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ana example@x.com"));
        assert!(!is_email("ana@@x.com"));
    }
}
