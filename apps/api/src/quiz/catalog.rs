//! Question keys and the closed option sets the quiz offers.

use serde::Serialize;

pub const ACADEMIC_INTERESTS: &str = "academicInterests";
pub const LEARNING_STYLE: &str = "learningStyle";
pub const TEAM_WORK: &str = "teamWork";
pub const PREFERRED_ACTIVITIES: &str = "preferredActivities";
pub const RESOURCE_PREFERENCES: &str = "resourcePreferences";
pub const VOCATIONAL_AREAS: &str = "vocationalAreas";
pub const STUDY_EXPECTATION: &str = "studyExpectation";
pub const TIME_COMMITMENT: &str = "timeCommitment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: &'static str,
    pub label: &'static str,
}

const fn choice(id: &'static str, label: &'static str) -> Choice {
    Choice { id, label }
}

pub const ACADEMIC_SUBJECTS: &[Choice] = &[
    choice("matematicas", "Matemáticas"),
    choice("fisica", "Física"),
    choice("quimica", "Química"),
    choice("biologia", "Biología"),
    choice("historia", "Historia"),
    choice("literatura", "Literatura"),
    choice("artes", "Artes"),
    choice("informatica", "Informática"),
    choice("idiomas", "Idiomas"),
    choice("musica", "Música"),
    choice("geografia", "Geografía"),
    choice("economia", "Economía"),
];

pub const LEARNING_STYLES: &[Choice] = &[
    choice("muy_practico", "Muy práctico"),
    choice("practico", "Práctico"),
    choice("equilibrado", "Equilibrado"),
    choice("teorico", "Teórico"),
    choice("muy_teorico", "Muy teórico"),
];

pub const TEAM_WORK_OPTIONS: &[Choice] = &[
    choice("equipo", "Prefiero trabajo en equipo"),
    choice("individual", "Prefiero trabajo individual"),
    choice("ambos", "Me adapto a ambos"),
];

pub const ACTIVITIES: &[Choice] = &[
    choice("proyectos", "Desarrollar proyectos"),
    choice("experimentos", "Hacer experimentos"),
    choice("investigacion", "Investigación"),
    choice("debates", "Debates y discusiones"),
    choice("programacion", "Programación"),
    choice("diseno", "Diseño"),
    choice("escritura", "Escritura"),
    choice("presentaciones", "Presentaciones"),
    choice("analisis", "Análisis de datos"),
    choice("creatividad", "Actividades creativas"),
];

pub const RESOURCE_TYPES: &[Choice] = &[
    choice("videos", "Videos educativos"),
    choice("articulos", "Artículos y blogs"),
    choice("cursos", "Cursos interactivos"),
    choice("libros", "Libros digitales"),
    choice("podcasts", "Podcasts"),
    choice("ejercicios", "Ejercicios prácticos"),
    choice("simuladores", "Simuladores"),
    choice("documentales", "Documentales"),
];

pub const AREAS: &[Choice] = &[
    choice("ciencia_tecnologia", "Ciencia y Tecnología"),
    choice("artes_humanidades", "Artes y Humanidades"),
    choice("ciencias_sociales", "Ciencias Sociales"),
    choice("salud_medicina", "Salud y Medicina"),
    choice("negocios_economia", "Negocios y Economía"),
    choice("ingenieria", "Ingeniería"),
    choice("informatica", "Informática y Software"),
    choice("educacion", "Educación"),
];

pub const STUDY_EXPECTATIONS: &[Choice] = &[
    choice("universidad", "Quiero prepararme para la universidad"),
    choice("autodidacta", "Prefiero aprendizaje autodidacta"),
    choice("ambos", "Me interesan ambas opciones"),
];

pub const TIME_COMMITMENTS: &[Choice] = &[
    choice("1-2_horas", "1-2 horas por semana"),
    choice("3-5_horas", "3-5 horas por semana"),
    choice("6-10_horas", "6-10 horas por semana"),
    choice("mas_10_horas", "Más de 10 horas por semana"),
];

/// A quiz question: its answer key, display label and option set.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub key: &'static str,
    pub label: &'static str,
    pub choices: &'static [Choice],
}

/// Every question in display order.
pub const QUESTIONS: &[Question] = &[
    Question {
        key: ACADEMIC_INTERESTS,
        label: "Materias de interés",
        choices: ACADEMIC_SUBJECTS,
    },
    Question {
        key: LEARNING_STYLE,
        label: "Estilo de aprendizaje",
        choices: LEARNING_STYLES,
    },
    Question {
        key: TEAM_WORK,
        label: "Preferencia de trabajo",
        choices: TEAM_WORK_OPTIONS,
    },
    Question {
        key: PREFERRED_ACTIVITIES,
        label: "Actividades preferidas",
        choices: ACTIVITIES,
    },
    Question {
        key: RESOURCE_PREFERENCES,
        label: "Recursos preferidos",
        choices: RESOURCE_TYPES,
    },
    Question {
        key: VOCATIONAL_AREAS,
        label: "Áreas vocacionales",
        choices: AREAS,
    },
    Question {
        key: STUDY_EXPECTATION,
        label: "Expectativa de estudio",
        choices: STUDY_EXPECTATIONS,
    },
    Question {
        key: TIME_COMMITMENT,
        label: "Tiempo disponible",
        choices: TIME_COMMITMENTS,
    },
];

pub fn question(key: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.key == key)
}

pub fn label_for(choices: &[Choice], id: &str) -> Option<&'static str> {
    choices.iter().find(|c| c.id == id).map(|c| c.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_lookup() {
        let q = question(VOCATIONAL_AREAS).unwrap();
        assert_eq!(q.choices.len(), 8);
        assert!(question("favouriteColour").is_none());
    }

    #[test]
    fn test_label_for_known_and_unknown() {
        assert_eq!(label_for(ACADEMIC_SUBJECTS, "informatica"), Some("Informática"));
        assert_eq!(label_for(ACADEMIC_SUBJECTS, "astrologia"), None);
    }

    #[test]
    fn test_option_ids_are_unique_per_question() {
        for q in QUESTIONS {
            let mut ids: Vec<_> = q.choices.iter().map(|c| c.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), q.choices.len(), "duplicate id in {}", q.key);
        }
    }
}
