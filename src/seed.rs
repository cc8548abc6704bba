//! Startup seeding.

use crate::identity::{AccountError, CredentialStore};
use crate::models::NewAccount;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@taskapp.com";
pub const ADMIN_FULL_NAME: &str = "Administrator";
/// Satisfies the default password policy: upper, lower and special characters, no digit.
pub const ADMIN_PASSWORD: &str = "Admin@ICAD!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyExists,
}

/// Makes sure the administrative account exists. Looks the account up before creating
/// it, so running this on every start never produces a second admin.
pub async fn ensure_admin(store: &dyn CredentialStore) -> Result<SeedOutcome, AccountError> {
    if store.find_by_name(ADMIN_USERNAME).await?.is_some() {
        log::info!("Admin user already exists.");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let admin = NewAccount {
        username: ADMIN_USERNAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        full_name: ADMIN_FULL_NAME.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };

    match store.create_account(admin).await {
        Ok(_) => {
            log::info!("Admin user created successfully.");
            Ok(SeedOutcome::Created)
        }
        Err(err) => {
            log::error!("Failed to create admin user: {}", err);
            Err(err)
        }
    }
}
