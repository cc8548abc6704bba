pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::locale::FieldErrors;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::{AuthMiddleware, LOGIN_PATH, SESSION_COOKIE};
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims, SessionKeys};

/// Form posted by the login page.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom = "not_blank")]
    pub username: String,
    #[serde(default, skip_serializing)]
    #[validate(custom = "not_blank")]
    pub password: String,
    /// Keep the session cookie after the browser closes.
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default, rename = "ReturnUrl")]
    pub return_url: Option<String>,
}

/// Form posted by the registration page.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(custom = "not_blank")]
    pub username: String,
    #[serde(default)]
    #[validate(custom = "not_blank", email)]
    pub email: String,
    #[serde(default)]
    #[validate(custom = "not_blank")]
    pub full_name: String,
    #[serde(default, skip_serializing)]
    #[validate(custom = "not_blank", length(min = 8, max = 100))]
    pub password: String,
    #[serde(default, skip_serializing)]
    #[validate(must_match = "password")]
    pub confirm_password: String,
}

/// Login page document.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginView {
    pub return_url: Option<String>,
}

/// Redisplay of an account form after it was refused.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountFormView<F> {
    pub form: F,
    pub errors: FieldErrors,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Only same-site paths are followed after sign-in.
pub fn safe_return_url(return_url: Option<&str>) -> &str {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\") => {
            url
        }
        _ => "/Tasks",
    }
}

/// Cookie carrying a freshly issued session token. `persistent` cookies outlive the
/// browser session; the token inside expires after the session lifetime either way.
pub fn session_cookie(token: String, keys: &SessionKeys, persistent: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    if persistent {
        cookie.set_max_age(CookieDuration::minutes(keys.ttl_minutes()));
    }
    cookie
}

/// Cookie that makes the browser drop the session.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
