//! Anti-forgery checks for state-changing requests.
//!
//! Each session token carries a random anti-forgery value (see [`Claims`](crate::auth::Claims)).
//! Pages hand it out as `antiforgery_token`; forms post it back in the
//! `__RequestVerificationToken` field, scripts may send it in the
//! `RequestVerificationToken` header instead.

use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::AppError;

pub const ANTIFORGERY_HEADER: &str = "RequestVerificationToken";

/// Body of forms that carry nothing but the anti-forgery token.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AntiForgeryForm {
    #[serde(default, rename = "__RequestVerificationToken")]
    pub token: String,
}

/// Rejects the request unless the posted token belongs to the current session.
pub fn validate_antiforgery(
    req: &HttpRequest,
    user: &CurrentUser,
    form_token: &str,
) -> Result<(), AppError> {
    let presented = if form_token.is_empty() {
        req.headers()
            .get(ANTIFORGERY_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    } else {
        form_token
    };

    if presented.is_empty() || !constant_time_eq(presented.as_bytes(), user.antiforgery_token().as_bytes()) {
        log::warn!(
            "Rejected anti-forgery token for {} on {}",
            user.username(),
            req.path()
        );
        return Err(AppError::BadRequest("Invalid anti-forgery token".into()));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use actix_web::test as actix_test;

    fn user() -> CurrentUser {
        CurrentUser(Claims {
            sub: "u-1".to_string(),
            name: "jane".to_string(),
            csrf: "abc123".to_string(),
            exp: 0,
        })
    }

    #[test]
    fn test_form_token_must_match_session() {
        let req = actix_test::TestRequest::post().uri("/Tasks/Delete/1").to_http_request();
        assert!(validate_antiforgery(&req, &user(), "abc123").is_ok());
        assert!(matches!(
            validate_antiforgery(&req, &user(), "abc124"),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_antiforgery(&req, &user(), "").is_err());
    }

    #[test]
    fn test_header_token_is_accepted() {
        let req = actix_test::TestRequest::post()
            .uri("/Tasks/ToggleComplete/1")
            .insert_header((ANTIFORGERY_HEADER, "abc123"))
            .to_http_request();
        assert!(validate_antiforgery(&req, &user(), "").is_ok());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"same", b"same"));
        assert!(!constant_time_eq(b"same", b"sane"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }
}
