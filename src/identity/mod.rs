//! Accounts and credentials.
//!
//! Controllers and the seed routine only see the [`CredentialStore`] trait. The SQLite
//! implementation hashes passwords with bcrypt and enforces [`PasswordPolicy`] and
//! [`UserPolicy`] before anything is written.

pub mod policy;
pub mod store;

use std::fmt;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewAccount, User};

pub use policy::{PasswordPolicy, UserPolicy};
pub use store::SqliteCredentialStore;

/// A rule an account creation request broke, addressed to a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountViolation {
    pub field: &'static str,
    pub code: &'static str,
}

impl AccountViolation {
    pub fn new(field: &'static str, code: &'static str) -> Self {
        Self { field, code }
    }

    pub fn password(code: &'static str) -> Self {
        Self::new("password", code)
    }
}

#[derive(Debug)]
pub enum AccountError {
    /// The request was refused; nothing was written.
    Rejected(Vec<AccountViolation>),
    Store(AppError),
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccountError::Rejected(violations) => {
                let codes = violations
                    .iter()
                    .map(|v| format!("{}: {}", v.field, v.code))
                    .collect::<Vec<_>>();
                write!(f, "{}", codes.join(", "))
            }
            AccountError::Store(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<AppError> for AccountError {
    fn from(error: AppError) -> Self {
        AccountError::Store(error)
    }
}

impl From<sqlx::Error> for AccountError {
    fn from(error: sqlx::Error) -> Self {
        AccountError::Store(error.into())
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Creates an account after checking the password and user policies and the
    /// uniqueness of the user name (and e-mail, when the policy asks for it).
    async fn create_account(&self, account: NewAccount) -> Result<User, AccountError>;

    /// Looks an account up by user name, ignoring case.
    async fn find_by_name(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// The account when `password` matches its stored hash, `None` otherwise.
    async fn verify_credential(&self, username: &str, password: &str)
        -> Result<Option<User>, AppError>;

    /// All accounts, or those whose user name, e-mail or full name contains `search`
    /// (case-sensitive).
    async fn list_accounts(&self, search: Option<&str>) -> Result<Vec<User>, AppError>;
}
