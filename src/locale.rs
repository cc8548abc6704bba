//! Display locale.
//!
//! The locale is plain configuration: it is read once into [`Config`](crate::config::Config),
//! stored in application data and passed explicitly to every formatting call.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use validator::ValidationErrors;

use crate::error::AppError;

/// Field name to human readable messages, in field order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en-us" | "en" => Ok(Locale::EnUs),
            other => Err(AppError::Configuration(format!("Unsupported locale: {}", other))),
        }
    }
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::EnUs => "en-US",
        }
    }

    pub fn format_date(self, date: NaiveDate) -> String {
        match self {
            Locale::PtBr => date.format("%d/%m/%Y").to_string(),
            Locale::EnUs => date.format("%m/%d/%Y").to_string(),
        }
    }

    /// Message shown next to a form field for a validator error code.
    pub fn message(self, field: &str, code: &str) -> String {
        let text = match (self, field, code) {
            (Locale::PtBr, "title", "required") => "O título é obrigatório",
            (Locale::PtBr, "title", "length") => {
                "O Título deve ter pelo menos 3 e no máximo 100 caracteres."
            }
            (Locale::PtBr, "description", "length") => {
                "A descrição deve ter no máximo 500 caracteres."
            }
            (Locale::PtBr, "due_date", "required") => "A data de entrega é obrigatória",
            (Locale::PtBr, "difficulty", "required") => "A dificuldade é obrigatória",
            (Locale::PtBr, "difficulty", "length") => {
                "A dificuldade deve ter no máximo 50 caracteres."
            }
            (Locale::PtBr, "username", "required") => "O nome de usuário é obrigatório",
            (Locale::PtBr, "username", "invalid_characters") => {
                "O nome de usuário contém caracteres inválidos."
            }
            (Locale::PtBr, "username", "duplicate") => "Este nome de usuário já está em uso.",
            (Locale::PtBr, "email", "required") => "O e-mail é obrigatório",
            (Locale::PtBr, "email", "email") => "Formato de e-mail inválido",
            (Locale::PtBr, "email", "duplicate") => "Este e-mail já está em uso.",
            (Locale::PtBr, "full_name", "required") => "O nome completo é obrigatório",
            (Locale::PtBr, "password", "required") => "A senha é obrigatória",
            (Locale::PtBr, "password", "length") => {
                "A Senha deve ter pelo menos 8 e no máximo 100 caracteres."
            }
            (Locale::PtBr, "password", "password_too_short") => {
                "A senha deve ter pelo menos 8 caracteres."
            }
            (Locale::PtBr, "password", "password_requires_upper") => {
                "A senha deve conter pelo menos uma letra maiúscula."
            }
            (Locale::PtBr, "password", "password_requires_lower") => {
                "A senha deve conter pelo menos uma letra minúscula."
            }
            (Locale::PtBr, "password", "password_requires_digit") => {
                "A senha deve conter pelo menos um dígito."
            }
            (Locale::PtBr, "password", "password_requires_non_alphanumeric") => {
                "A senha deve conter pelo menos um caractere especial."
            }
            (Locale::PtBr, "confirm_password", "must_match") => {
                "A senha e a confirmação de senha não correspondem."
            }
            (Locale::PtBr, _, "invalid_login") => "Tentativa de login inválida.",
            (Locale::PtBr, _, _) => "Valor inválido.",

            (Locale::EnUs, "title", "required") => "Title is required",
            (Locale::EnUs, "title", "length") => {
                "Title must be at least 3 and at most 100 characters long."
            }
            (Locale::EnUs, "description", "length") => {
                "Description must be at most 500 characters long."
            }
            (Locale::EnUs, "due_date", "required") => "Due date is required",
            (Locale::EnUs, "difficulty", "required") => "Difficulty is required",
            (Locale::EnUs, "difficulty", "length") => {
                "Difficulty must be at most 50 characters long."
            }
            (Locale::EnUs, "username", "required") => "Username is required",
            (Locale::EnUs, "username", "invalid_characters") => {
                "Username contains invalid characters."
            }
            (Locale::EnUs, "username", "duplicate") => "This username is already taken.",
            (Locale::EnUs, "email", "required") => "Email is required",
            (Locale::EnUs, "email", "email") => "Invalid email format",
            (Locale::EnUs, "email", "duplicate") => "This email is already registered.",
            (Locale::EnUs, "full_name", "required") => "Full name is required",
            (Locale::EnUs, "password", "required") => "Password is required",
            (Locale::EnUs, "password", "length") => {
                "Password must be at least 8 and at most 100 characters long."
            }
            (Locale::EnUs, "password", "password_too_short") => {
                "Password must be at least 8 characters long."
            }
            (Locale::EnUs, "password", "password_requires_upper") => {
                "Password must contain an uppercase letter."
            }
            (Locale::EnUs, "password", "password_requires_lower") => {
                "Password must contain a lowercase letter."
            }
            (Locale::EnUs, "password", "password_requires_digit") => {
                "Password must contain a digit."
            }
            (Locale::EnUs, "password", "password_requires_non_alphanumeric") => {
                "Password must contain a non-alphanumeric character."
            }
            (Locale::EnUs, "confirm_password", "must_match") => {
                "The password and confirmation password do not match."
            }
            (Locale::EnUs, _, "invalid_login") => "Invalid login attempt.",
            (Locale::EnUs, _, _) => "Invalid value.",
        };
        text.to_string()
    }

    /// Turns validator output into per-field messages.
    ///
    /// A `required` failure hides the other failures of the same field, so an empty
    /// title reports only that it is missing.
    pub fn localize(self, errors: &ValidationErrors) -> FieldErrors {
        let mut localized = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let required = field_errors.iter().any(|e| e.code == "required");
            let messages = field_errors
                .iter()
                .filter(|e| !required || e.code == "required")
                .map(|e| self.message(field, &e.code))
                .collect::<Vec<_>>();
            localized.insert(field.to_string(), messages);
        }
        localized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_tags() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("en_US".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!(" EN ".parse::<Locale>().unwrap(), Locale::EnUs);
        assert!("fr-FR".parse::<Locale>().is_err());

        for locale in [Locale::PtBr, Locale::EnUs] {
            assert_eq!(locale.tag().parse::<Locale>().unwrap(), locale);
        }
    }

    #[test]
    fn test_format_date_per_locale() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(Locale::PtBr.format_date(date), "31/01/2024");
        assert_eq!(Locale::EnUs.format_date(date), "01/31/2024");
    }

    #[test]
    fn test_required_hides_other_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("title", validator::ValidationError::new("required"));
        errors.add("title", validator::ValidationError::new("length"));
        errors.add("description", validator::ValidationError::new("length"));

        let localized = Locale::EnUs.localize(&errors);
        assert_eq!(localized["title"], vec!["Title is required".to_string()]);
        assert_eq!(
            localized["description"],
            vec!["Description must be at most 500 characters long.".to_string()]
        );
    }
}
