//! Content Synthesizer: placeholder course suggestions derived from learning paths.
//!
//! Every random choice goes through the injected `Rng`, so a seeded generator
//! reproduces the same courses.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::quiz::models::{LearningPathRecord, Level};
use crate::recommendations::subjects::{
    instructors_for, subject_for_interest, subjects_in_title, thumbnail_for,
};

pub const MAX_SUBJECTS_PER_PATH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSuggestion {
    pub id: String,
    pub title: String,
    pub instructor: String,
    pub rating: f32,
    pub thumbnail: String,
    pub category: String,
    pub level: String,
    pub duration: String,
    pub university: String,
    pub description: String,
    pub is_from_user_path: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_title: Option<String>,
}

/// Up to three subjects: mapped interests first, then title keywords.
pub fn extract_subjects(record: &LearningPathRecord) -> Vec<String> {
    let mut subjects: Vec<String> = Vec::new();
    let mut push = |subject: String| {
        if !subject.is_empty() && !subjects.contains(&subject) {
            subjects.push(subject);
        }
    };

    for interest in record.path.interests.split(',') {
        push(subject_for_interest(interest));
    }
    for subject in subjects_in_title(&record.path.title) {
        push(subject.to_string());
    }

    subjects.truncate(MAX_SUBJECTS_PER_PATH);
    subjects
}

/// Course level for a path: its difficulty label when recognised, else its level.
fn course_level(record: &LearningPathRecord) -> Level {
    record
        .path
        .difficulty
        .as_deref()
        .and_then(Level::parse)
        .unwrap_or(record.path.level)
}

fn course_title<R: Rng + ?Sized>(subject: &str, level: Level, rng: &mut R) -> String {
    let templates: [String; 3] = match level {
        Level::Beginner => [
            format!("Introducción a {subject}"),
            format!("Fundamentos de {subject}"),
            format!("{subject} para Principiantes"),
        ],
        Level::Intermediate => [
            format!("{subject} Universitario"),
            format!("Curso Completo de {subject}"),
            format!("{subject} Aplicado"),
        ],
        Level::Advanced => [
            format!("{subject} Avanzado"),
            format!("Especialización en {subject}"),
            format!("{subject} para Profesionales"),
        ],
    };
    let index = rng.gen_range(0..templates.len());
    templates[index].clone()
}

fn course_description(subject: &str, level: Level) -> String {
    match level {
        Level::Beginner => format!(
            "Curso introductorio de {subject} diseñado para estudiantes que inician en esta materia."
        ),
        Level::Intermediate => format!(
            "Curso completo de {subject} a nivel universitario con enfoque práctico y teórico."
        ),
        Level::Advanced => format!(
            "Especialización en {subject} para estudiantes con conocimientos previos sólidos."
        ),
    }
}

fn university_for(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    let targets = [
        ("unam", "Para UNAM"),
        ("ipn", "Para IPN"),
        ("uam", "Para UAM"),
        ("medicina", "Para Medicina"),
        ("ingeniería", "Para Ingeniería"),
        ("ingenieria", "Para Ingeniería"),
        ("humanidades", "Para Humanidades"),
        ("exani", "Para EXANI-II"),
    ];
    targets
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, university)| *university)
        .unwrap_or("Universitario General")
}

/// Rating in `[3.5, 5.0]` rounded to one decimal.
fn rating<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let tenths: u8 = rng.gen_range(35..=50);
    f32::from(tenths) / 10.0
}

/// `"{20..=59}h {0..=59}min"`.
fn duration<R: Rng + ?Sized>(rng: &mut R) -> String {
    let hours: u32 = rng.gen_range(20..60);
    let minutes: u32 = rng.gen_range(0..60);
    format!("{hours}h {minutes}min")
}

pub fn generate_courses_from_path<R: Rng + ?Sized>(
    record: &LearningPathRecord,
    rng: &mut R,
) -> Vec<CourseSuggestion> {
    let level = course_level(record);
    let university = university_for(&record.path.title);

    extract_subjects(record)
        .into_iter()
        .enumerate()
        .map(|(index, subject)| {
            let instructor = instructors_for(&subject)
                .choose(rng)
                .copied()
                .unwrap_or_default();
            CourseSuggestion {
                id: format!("{}-course-{index}", record.id),
                title: course_title(&subject, level, rng),
                instructor: instructor.to_string(),
                rating: rating(rng),
                thumbnail: thumbnail_for(&subject).to_string(),
                category: subject.clone(),
                level: level.course_label().to_string(),
                duration: duration(rng),
                university: university.to_string(),
                description: course_description(&subject, level),
                is_from_user_path: true,
                path_id: Some(record.id.to_string()),
                path_title: Some(record.path.title.clone()),
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn general_course(
    id: &str,
    title: &str,
    instructor: &str,
    rating: f32,
    category: &str,
    level: Level,
    duration: &str,
    university: &str,
    description: &str,
) -> CourseSuggestion {
    CourseSuggestion {
        id: id.to_string(),
        title: title.to_string(),
        instructor: instructor.to_string(),
        rating,
        thumbnail: thumbnail_for(category).to_string(),
        category: category.to_string(),
        level: level.course_label().to_string(),
        duration: duration.to_string(),
        university: university.to_string(),
        description: description.to_string(),
        is_from_user_path: false,
        path_id: None,
        path_title: None,
    }
}

/// Fixed catalog used to pad short recommendation lists.
pub fn general_courses() -> Vec<CourseSuggestion> {
    vec![
        general_course(
            "general-1",
            "Matemáticas para Examen de Admisión",
            "Dr. Carlos Mendoza",
            4.8,
            "Matemáticas",
            Level::Intermediate,
            "45h 25min",
            "Para UNAM, IPN, UAM",
            "Preparación completa en matemáticas para exámenes de admisión universitaria.",
        ),
        general_course(
            "general-2",
            "Física Universitaria",
            "Dra. Ana Rodríguez",
            4.7,
            "Física",
            Level::Intermediate,
            "38h 45min",
            "Para Ingeniería",
            "Curso completo de física con enfoque en ingeniería y ciencias exactas.",
        ),
        general_course(
            "general-3",
            "Química General",
            "Dr. Roberto Silva",
            4.6,
            "Química",
            Level::Beginner,
            "42h 15min",
            "Para Ciencias",
            "Fundamentos de química para estudiantes de ciencias naturales.",
        ),
        general_course(
            "general-4",
            "Biología Molecular",
            "Dra. Carmen López",
            4.9,
            "Biología",
            Level::Advanced,
            "35h 30min",
            "Para Medicina",
            "Especialización en biología molecular para estudiantes de medicina.",
        ),
    ]
}

/// Per-path courses, padded with the general catalog when short, deduplicated
/// by id (first occurrence wins) and cut to `limit`.
pub fn recommend_courses<R: Rng + ?Sized>(
    paths: &[LearningPathRecord],
    limit: usize,
    rng: &mut R,
) -> Vec<CourseSuggestion> {
    let mut courses: Vec<CourseSuggestion> = paths
        .iter()
        .flat_map(|path| generate_courses_from_path(path, rng))
        .collect();

    dedupe_by_id(&mut courses);
    if courses.len() < limit {
        courses.extend(general_courses());
        dedupe_by_id(&mut courses);
    }
    courses.truncate(limit);
    courses
}

fn dedupe_by_id(courses: &mut Vec<CourseSuggestion>) {
    let mut seen = HashSet::new();
    courses.retain(|course| seen.insert(course.id.clone()));
}
