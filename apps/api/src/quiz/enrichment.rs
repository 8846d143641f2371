//! Fills the parts of a learning path the model left empty, from the quiz answers.

use crate::quiz::catalog::{
    ACADEMIC_INTERESTS, LEARNING_STYLE, PREFERRED_ACTIVITIES, TIME_COMMITMENT, VOCATIONAL_AREAS,
};
use crate::quiz::models::{LearningPathResult, QuizAnswers};
use crate::quiz::parser::ParsedLearningPath;

const MAX_COURSES: usize = 8;
const MAX_CAREER_PATHS: usize = 6;
const BASE_HOURS: f64 = 120.0;

fn courses_for_interest(interest: &str) -> &'static [&'static str] {
    match interest {
        "informatica" => &[
            "Fundamentos de Programación",
            "Desarrollo Web Básico",
            "Bases de Datos",
            "Algoritmos y Estructuras de Datos",
        ],
        "matematicas" => &[
            "Cálculo Diferencial",
            "Álgebra Lineal",
            "Estadística Aplicada",
            "Matemáticas Discretas",
        ],
        "ciencia_tecnologia" => &[
            "Método Científico",
            "Física Moderna",
            "Química General",
            "Investigación Aplicada",
        ],
        _ => &[],
    }
}

fn skills_for_activity(activity: &str) -> &'static [&'static str] {
    match activity {
        "proyectos" => &["Gestión de Proyectos", "Planificación"],
        "programacion" => &["Lógica de Programación", "Resolución de Problemas"],
        "investigacion" => &["Análisis Crítico", "Metodología de Investigación"],
        "creatividad" => &["Pensamiento Creativo", "Innovación"],
        _ => &[],
    }
}

fn careers_for_area(area: &str) -> &'static [&'static str] {
    match area {
        "informatica" => &[
            "Desarrollador de Software",
            "Ingeniero de Datos",
            "Ciberseguridad",
        ],
        "ciencia_tecnologia" => &["Investigador", "Científico de Datos", "Ingeniero de I+D"],
        "salud_medicina" => &["Médico", "Enfermero", "Investigador Biomédico"],
        "negocios_economia" => &[
            "Analista Financiero",
            "Emprendedor",
            "Consultor de Negocios",
        ],
        _ => &[],
    }
}

fn time_factor(commitment: Option<&str>) -> f64 {
    match commitment {
        Some("1-2_horas") => 0.5,
        Some("3-5_horas") => 1.0,
        Some("6-10_horas") => 1.5,
        Some("mas_10_horas") => 2.0,
        _ => 1.0,
    }
}

/// Total hours derived from the weekly commitment.
pub fn estimated_hours(answers: &QuizAnswers) -> u32 {
    (BASE_HOURS * time_factor(answers.text(TIME_COMMITMENT))).round() as u32
}

/// Spanish difficulty label from the learning-style scale.
pub fn difficulty_label(answers: &QuizAnswers) -> &'static str {
    match answers.text(LEARNING_STYLE) {
        Some("muy_practico") | Some("practico") => "Principiante",
        Some("equilibrado") | Some("teorico") => "Intermedio",
        _ => "Avanzado",
    }
}

fn collect_unique<'a>(
    keys: Vec<&str>,
    table: impl Fn(&str) -> &'a [&'a str],
    limit: Option<usize>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in keys.into_iter().flat_map(table) {
        if !out.iter().any(|existing| existing == item) {
            out.push((*item).to_string());
        }
    }
    if let Some(limit) = limit {
        out.truncate(limit);
    }
    out
}

pub fn enrich(parsed: ParsedLearningPath, answers: &QuizAnswers) -> LearningPathResult {
    let recompute_time = parsed.is_defaulted("estimatedTime");
    let mut path = parsed.result;

    if path.courses.is_empty() {
        path.courses = answers
            .list(ACADEMIC_INTERESTS)
            .into_iter()
            .flat_map(courses_for_interest)
            .take(MAX_COURSES)
            .map(|c| (*c).to_string())
            .collect();
    }
    if path.skills.is_empty() {
        path.skills = collect_unique(answers.list(PREFERRED_ACTIVITIES), skills_for_activity, None);
    }
    if path.career_paths.is_empty() {
        path.career_paths = collect_unique(
            answers.list(VOCATIONAL_AREAS),
            careers_for_area,
            Some(MAX_CAREER_PATHS),
        );
    }
    if recompute_time || path.estimated_time == 0 {
        path.estimated_time = estimated_hours(answers);
    }
    if path.difficulty.is_none() {
        path.difficulty = Some(difficulty_label(answers).to_string());
    }
    if path.interests.trim().is_empty() {
        path.interests = answers.list(ACADEMIC_INTERESTS).join(", ");
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::parser::parse_learning_path;

    fn answers() -> QuizAnswers {
        let mut a = QuizAnswers::new();
        a.set_many(ACADEMIC_INTERESTS, ["informatica", "matematicas", "ciencia_tecnologia"]);
        a.set_text(LEARNING_STYLE, "equilibrado");
        a.set_many(PREFERRED_ACTIVITIES, ["programacion", "proyectos", "programacion"]);
        a.set_many(
            VOCATIONAL_AREAS,
            ["informatica", "ciencia_tecnologia", "salud_medicina"],
        );
        a.set_text(TIME_COMMITMENT, "6-10_horas");
        a
    }

    #[test]
    fn test_fills_empty_sections() {
        let parsed = parse_learning_path(r#"{"title":"T","description":"D","level":"beginner"}"#)
            .unwrap();
        let path = enrich(parsed, &answers());

        assert_eq!(path.courses.len(), 8);
        assert_eq!(path.courses[0], "Fundamentos de Programación");
        assert_eq!(path.courses[4], "Cálculo Diferencial");
        assert_eq!(
            path.skills,
            vec![
                "Lógica de Programación",
                "Resolución de Problemas",
                "Gestión de Proyectos",
                "Planificación"
            ]
        );
        assert_eq!(path.career_paths.len(), 6);
        assert_eq!(path.career_paths[3], "Investigador");
        assert_eq!(path.estimated_time, 180);
        assert_eq!(path.difficulty.as_deref(), Some("Intermedio"));
        assert_eq!(path.interests, "informatica, matematicas, ciencia_tecnologia");
    }

    #[test]
    fn test_keeps_model_values() {
        let parsed = parse_learning_path(
            r#"{"title":"T","description":"D","level":"advanced","estimatedTime":40,
                "difficulty":"Avanzado","courses":["Rust"],"skills":["Ownership"],
                "careerPaths":["Ingeniero de Sistemas"],"interests":"sistemas"}"#,
        )
        .unwrap();
        let path = enrich(parsed, &answers());
        assert_eq!(path.courses, vec!["Rust"]);
        assert_eq!(path.skills, vec!["Ownership"]);
        assert_eq!(path.career_paths, vec!["Ingeniero de Sistemas"]);
        assert_eq!(path.estimated_time, 40);
        assert_eq!(path.difficulty.as_deref(), Some("Avanzado"));
        assert_eq!(path.interests, "sistemas");
    }

    #[test]
    fn test_estimated_hours_by_commitment() {
        let mut a = QuizAnswers::new();
        for (code, hours) in [
            ("1-2_horas", 60),
            ("3-5_horas", 120),
            ("6-10_horas", 180),
            ("mas_10_horas", 240),
            ("desconocido", 120),
        ] {
            a.set_text(TIME_COMMITMENT, code);
            assert_eq!(estimated_hours(&a), hours, "{code}");
        }
    }

    #[test]
    fn test_difficulty_scale() {
        let mut a = QuizAnswers::new();
        a.set_text(LEARNING_STYLE, "muy_practico");
        assert_eq!(difficulty_label(&a), "Principiante");
        a.set_text(LEARNING_STYLE, "teorico");
        assert_eq!(difficulty_label(&a), "Intermedio");
        a.set_text(LEARNING_STYLE, "muy_teorico");
        assert_eq!(difficulty_label(&a), "Avanzado");
    }

    #[test]
    fn test_unmapped_answers_leave_sections_empty() {
        let mut a = QuizAnswers::new();
        a.set_many(ACADEMIC_INTERESTS, ["musica"]);
        let parsed = parse_learning_path("sin json").unwrap();
        let path = enrich(parsed, &a);
        assert!(path.courses.is_empty());
        assert!(path.skills.is_empty());
        assert_eq!(path.estimated_time, 120);
        assert_eq!(path.interests, "musica");
    }
}
