use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An account as seen by the rest of the application. The password hash never leaves
/// the identity store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Input of `CredentialStore::create_account`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "searchString")]
    pub search_string: Option<String>,
}

impl UserQuery {
    pub fn search(&self) -> Option<&str> {
        self.search_string.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserViewModel {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl From<User> for UserViewModel {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListViewModel {
    pub users: Vec<UserViewModel>,
    pub current_filter: Option<String>,
}
