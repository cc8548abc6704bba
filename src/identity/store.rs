use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password, DEFAULT_HASH_COST};
use crate::error::AppError;
use crate::identity::{
    AccountError, AccountViolation, CredentialStore, PasswordPolicy, UserPolicy,
};
use crate::models::{NewAccount, User};

const USER_COLUMNS: &str = "id, username, email, full_name, created_at";

#[derive(Debug, FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Lookups ignore case by comparing upper-cased copies kept next to the originals.
fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Accounts kept in the `users` table.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
    password_policy: PasswordPolicy,
    user_policy: UserPolicy,
    hash_cost: u32,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            password_policy: PasswordPolicy::default(),
            user_policy: UserPolicy::default(),
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    pub fn with_policies(mut self, password_policy: PasswordPolicy, user_policy: UserPolicy) -> Self {
        self.password_policy = password_policy;
        self.user_policy = user_policy;
        self
    }

    /// bcrypt work factor; tests lower it to keep hashing fast.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    async fn name_taken(&self, normalized_username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE normalized_username = ?1)",
        )
        .bind(normalized_username)
        .fetch_one(&self.pool)
        .await
    }

    async fn email_taken(&self, normalized_email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE normalized_email = ?1)",
        )
        .bind(normalized_email)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn create_account(&self, account: NewAccount) -> Result<User, AccountError> {
        let username = account.username.trim().to_string();
        let normalized_username = normalize(&username);
        let normalized_email = normalize(&account.email);

        let mut violations = Vec::new();
        violations.extend(self.user_policy.check_username(&username));
        if !username.is_empty() && self.name_taken(&normalized_username).await? {
            violations.push(AccountViolation::new("username", "duplicate"));
        }
        if self.user_policy.require_unique_email && self.email_taken(&normalized_email).await? {
            violations.push(AccountViolation::new("email", "duplicate"));
        }
        violations.extend(self.password_policy.check(&account.password));

        if !violations.is_empty() {
            return Err(AccountError::Rejected(violations));
        }

        let password_hash = hash_password(&account.password, self.hash_cost)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            email: account.email.trim().to_string(),
            full_name: account.full_name.trim().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users \
             (id, username, normalized_username, email, normalized_email, full_name, \
              password_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&normalized_username)
        .bind(&user.email)
        .bind(&normalized_email)
        .bind(&user.full_name)
        .bind(&password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        log::info!("Created account {} ({})", user.username, user.id);
        Ok(user)
    }

    async fn find_by_name(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE normalized_username = ?1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(normalize(username))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn verify_credential(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {}, password_hash FROM users WHERE normalized_username = ?1",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(normalize(username))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) if verify_password(password, &row.password_hash)? => Ok(Some(row.user)),
            _ => Ok(None),
        }
    }

    async fn list_accounts(&self, search: Option<&str>) -> Result<Vec<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users \
             WHERE (?1 IS NULL OR instr(username, ?1) > 0 OR instr(email, ?1) > 0 \
                    OR instr(full_name, ?1) > 0) \
             ORDER BY username",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}
