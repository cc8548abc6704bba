use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The signed-in account of the current request.
///
/// Populated by `AuthMiddleware`; extraction fails with `AppError::Unauthorized` when no
/// session claims are present, which only happens on routes the middleware lets through
/// anonymously.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    pub fn username(&self) -> &str {
        &self.0.name
    }

    /// Anti-forgery token to embed in forms rendered for this session.
    pub fn antiforgery_token(&self) -> &str {
        &self.0.csrf
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(CurrentUser(claims))),
            None => {
                let err = AppError::Unauthorized("No active session".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
