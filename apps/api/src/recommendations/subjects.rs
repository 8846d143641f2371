//! Canonical subjects and the keyword tables that map free text onto them.

pub const MATEMATICAS: &str = "Matemáticas";
pub const FISICA: &str = "Física";
pub const QUIMICA: &str = "Química";
pub const BIOLOGIA: &str = "Biología";
pub const HISTORIA: &str = "Historia";
pub const LITERATURA: &str = "Literatura";
pub const INGLES: &str = "Inglés";
pub const PROGRAMACION: &str = "Programación";

/// Interest token → canonical subject. Tokens are compared lowercased.
const INTEREST_SUBJECTS: &[(&str, &str)] = &[
    ("matemáticas", MATEMATICAS),
    ("matematicas", MATEMATICAS),
    ("algebra", MATEMATICAS),
    ("cálculo", MATEMATICAS),
    ("calculo", MATEMATICAS),
    ("geometría", MATEMATICAS),
    ("geometria", MATEMATICAS),
    ("física", FISICA),
    ("fisica", FISICA),
    ("mecánica", FISICA),
    ("mecanica", FISICA),
    ("química", QUIMICA),
    ("quimica", QUIMICA),
    ("biología", BIOLOGIA),
    ("biologia", BIOLOGIA),
    ("historia", HISTORIA),
    ("literatura", LITERATURA),
    ("inglés", INGLES),
    ("ingles", INGLES),
    ("programación", PROGRAMACION),
    ("programacion", PROGRAMACION),
    ("informatica", PROGRAMACION),
    ("informática", PROGRAMACION),
    ("ciencias", "Ciencias Naturales"),
    ("humanidades", "Humanidades"),
];

/// Subject → keywords searched for in learning-path titles.
const TITLE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        MATEMATICAS,
        &["matemática", "álgebra", "cálculo", "geometría", "trigonometría", "estadística"],
    ),
    (
        FISICA,
        &["física", "mecánica", "óptica", "termodinámica", "electromagnetismo"],
    ),
    (QUIMICA, &["química", "orgánica", "inorgánica", "bioquímica"]),
    (BIOLOGIA, &["biología", "anatomía", "genética", "ecología", "medicina"]),
    (HISTORIA, &["historia", "civilización", "cultura", "sociedad"]),
    (LITERATURA, &["literatura", "lengua", "español", "redacción"]),
    (INGLES, &["inglés", "english", "idioma"]),
    (
        PROGRAMACION,
        &["programación", "software", "computación", "informática"],
    ),
];

const INSTRUCTORS: &[(&str, [&str; 3])] = &[
    (MATEMATICAS, ["Dr. Carlos Mendoza", "Dra. Ana Rodríguez", "Prof. Luis García"]),
    (FISICA, ["Dr. Roberto Silva", "Dra. Carmen López", "Prof. Miguel Torres"]),
    (QUIMICA, ["Dra. Elena Martínez", "Dr. Andrés Vega", "Prof. Sofia Herrera"]),
    (BIOLOGIA, ["Dr. Fernando Castro", "Dra. Isabel Ruiz", "Prof. Diego Morales"]),
    (HISTORIA, ["Dr. Ricardo Paz", "Dra. Laura Jiménez", "Prof. Carlos Sánchez"]),
    (LITERATURA, ["Dra. Patricia Ramos", "Prof. Alejandro Núñez", "Lic. María González"]),
    (INGLES, ["Prof. Jennifer Smith", "Lic. Michael Johnson", "Dra. Sarah Williams"]),
    (PROGRAMACION, ["Ing. David López", "Dr. Ana Castillo", "Prof. Javier Moreno"]),
];

const THUMBNAILS: &[(&str, &str)] = &[
    (MATEMATICAS, "https://images.unsplash.com/photo-1509228468518-180dd4864904?w=300&h=200&fit=crop"),
    (FISICA, "https://images.unsplash.com/photo-1636466497217-26a8cbeaf0aa?w=300&h=200&fit=crop"),
    (QUIMICA, "https://images.unsplash.com/photo-1532634922-8fe0b757fb13?w=300&h=200&fit=crop"),
    (BIOLOGIA, "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=300&h=200&fit=crop"),
    (HISTORIA, "https://images.unsplash.com/photo-1481627834876-b7833e8f5570?w=300&h=200&fit=crop"),
    (LITERATURA, "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=300&h=200&fit=crop"),
    (INGLES, "https://images.unsplash.com/photo-1434030216411-0b793f4b4173?w=300&h=200&fit=crop"),
    (PROGRAMACION, "https://images.unsplash.com/photo-1461749280684-dccba630e2f6?w=300&h=200&fit=crop"),
];

/// Canonical subject for an interest token; unknown tokens pass through trimmed.
pub fn subject_for_interest(interest: &str) -> String {
    let token = interest.trim();
    let lower = token.to_lowercase();
    INTEREST_SUBJECTS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, subject)| (*subject).to_string())
        .unwrap_or_else(|| token.to_string())
}

/// Subjects whose keywords appear in `title`, in table order.
pub fn subjects_in_title(title: &str) -> Vec<&'static str> {
    let lower = title.to_lowercase();
    TITLE_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(subject, _)| *subject)
        .collect()
}

/// Instructor roster for a subject, falling back to the mathematics roster.
pub fn instructors_for(subject: &str) -> &'static [&'static str; 3] {
    INSTRUCTORS
        .iter()
        .find(|(s, _)| *s == subject)
        .map(|(_, roster)| roster)
        .unwrap_or(&INSTRUCTORS[0].1)
}

pub fn thumbnail_for(subject: &str) -> &'static str {
    THUMBNAILS
        .iter()
        .find(|(s, _)| *s == subject)
        .map(|(_, url)| *url)
        .unwrap_or(THUMBNAILS[0].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_mapping() {
        assert_eq!(subject_for_interest("matematicas"), MATEMATICAS);
        assert_eq!(subject_for_interest(" Física "), FISICA);
        assert_eq!(subject_for_interest("informatica"), PROGRAMACION);
        assert_eq!(subject_for_interest("Astronomía"), "Astronomía");
    }

    #[test]
    fn test_title_keywords() {
        assert_eq!(
            subjects_in_title("Ruta de Álgebra y Genética"),
            vec![MATEMATICAS, BIOLOGIA]
        );
        assert!(subjects_in_title("Ruta Personalizada").is_empty());
    }

    #[test]
    fn test_roster_fallback() {
        assert_eq!(instructors_for(QUIMICA)[0], "Dra. Elena Martínez");
        assert_eq!(instructors_for("Astronomía")[0], "Dr. Carlos Mendoza");
        assert!(thumbnail_for("Astronomía").contains("1509228468518"));
    }
}
