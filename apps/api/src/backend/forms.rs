//! Field schemas for the account forms, checked before anything reaches the backend.

use crate::quiz::models::FormValues;
use crate::quiz::validation::{validate_fields, FieldErrors, FieldSpec, Rule};

const REQUIRED: Rule = Rule::Required {
    message: "Este campo es obligatorio",
};
const EMAIL: Rule = Rule::Email {
    message: "Ingresa un email válido",
};

pub const LOGIN_FORM: &[FieldSpec] = &[
    FieldSpec {
        key: "email",
        label: "Email",
        rules: &[REQUIRED, EMAIL],
    },
    FieldSpec {
        key: "password",
        label: "Contraseña",
        rules: &[REQUIRED],
    },
];

pub const REGISTER_FORM: &[FieldSpec] = &[
    FieldSpec {
        key: "username",
        label: "Nombre de usuario",
        rules: &[REQUIRED],
    },
    FieldSpec {
        key: "nombres",
        label: "Nombres",
        rules: &[REQUIRED],
    },
    FieldSpec {
        key: "apellidos",
        label: "Apellidos",
        rules: &[REQUIRED],
    },
    FieldSpec {
        key: "email",
        label: "Email",
        rules: &[REQUIRED, EMAIL],
    },
    FieldSpec {
        key: "ultimo_grado_estudios",
        label: "Último grado de estudios",
        rules: &[REQUIRED],
    },
    FieldSpec {
        key: "estado",
        label: "Estado",
        rules: &[REQUIRED],
    },
    FieldSpec {
        key: "password",
        label: "Contraseña",
        rules: &[
            REQUIRED,
            Rule::MinLength {
                min: 8,
                message: "La contraseña debe tener al menos 8 caracteres",
            },
        ],
    },
    FieldSpec {
        key: "password_confirm",
        label: "Confirmar contraseña",
        rules: &[
            REQUIRED,
            Rule::Matches {
                field: "password",
                message: "Las contraseñas no coinciden",
            },
        ],
    },
];

/// Validated login credentials.
pub fn login_credentials(values: &FormValues) -> Result<(&str, &str), FieldErrors> {
    validate_fields(LOGIN_FORM, values)?;
    let email = values.text("email").map(str::trim).unwrap_or_default();
    Ok((email, values.text("password").unwrap_or_default()))
}

pub fn validate_registration(values: &FormValues) -> Result<(), FieldErrors> {
    validate_fields(REGISTER_FORM, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> FormValues {
        let mut v = FormValues::new();
        v.set_text("username", "ana_1234");
        v.set_text("nombres", "Ana");
        v.set_text("apellidos", "Pérez");
        v.set_text("email", "ana@example.com");
        v.set_text("ultimo_grado_estudios", "preparatoria");
        v.set_text("estado", "jalisco");
        v.set_text("password", "supersecreta");
        v.set_text("password_confirm", "supersecreta");
        v
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = login_credentials(&FormValues::new()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["email"], "Este campo es obligatorio");
    }

    #[test]
    fn test_login_rejects_malformed_email() {
        let mut v = FormValues::new();
        v.set_text("email", "ana@");
        v.set_text("password", "x");
        let errors = login_credentials(&v).unwrap_err();
        assert_eq!(errors["email"], "Ingresa un email válido");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_login_trims_email() {
        let mut v = FormValues::new();
        v.set_text("email", " ana@example.com ");
        v.set_text("password", " clave ");
        assert_eq!(
            login_credentials(&v).unwrap(),
            ("ana@example.com", " clave ")
        );
    }

    #[test]
    fn test_complete_registration_passes() {
        assert!(validate_registration(&registration()).is_ok());
    }

    #[test]
    fn test_registration_password_rules() {
        let mut v = registration();
        v.set_text("password", "corta");
        v.set_text("password_confirm", "distinta");
        let errors = validate_registration(&v).unwrap_err();
        assert_eq!(
            errors["password"],
            "La contraseña debe tener al menos 8 caracteres"
        );
        assert_eq!(errors["password_confirm"], "Las contraseñas no coinciden");
    }
}
