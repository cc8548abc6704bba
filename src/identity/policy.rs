use lazy_static::lazy_static;
use regex::Regex;

use crate::identity::AccountViolation;

lazy_static! {
    // Letters, digits and -._@+
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9\-._@+]+$").unwrap();
}

/// Password rules checked when an account is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    /// At least eight characters with upper, lower and a special character; digits optional.
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: false,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks, empty when it is acceptable.
    pub fn check(&self, password: &str) -> Vec<AccountViolation> {
        let mut violations = Vec::new();
        if password.chars().count() < self.min_length {
            violations.push(AccountViolation::password("password_too_short"));
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            violations.push(AccountViolation::password("password_requires_upper"));
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            violations.push(AccountViolation::password("password_requires_lower"));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(AccountViolation::password("password_requires_digit"));
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            violations.push(AccountViolation::password(
                "password_requires_non_alphanumeric",
            ));
        }
        violations
    }
}

/// Rules on user names and e-mail addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPolicy {
    pub require_unique_email: bool,
}

impl Default for UserPolicy {
    fn default() -> Self {
        Self {
            require_unique_email: true,
        }
    }
}

impl UserPolicy {
    pub fn check_username(&self, username: &str) -> Option<AccountViolation> {
        if username.is_empty() {
            return Some(AccountViolation::new("username", "required"));
        }
        if !USERNAME_REGEX.is_match(username) {
            return Some(AccountViolation::new("username", "invalid_characters"));
        }
        None
    }
}
