use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{verify_token, Claims, SessionKeys};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "TaskApp.Session";

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/Account/Login";

/// Paths reachable without a session.
const ANONYMOUS_PATHS: &[&str] = &["/health", "/Account/Login", "/Account/Register"];

/// Requires a valid session on every path except [`ANONYMOUS_PATHS`].
///
/// The session token is read from the [`SESSION_COOKIE`] cookie, or from an
/// `Authorization: Bearer` header for non-browser clients. Valid claims are stored in
/// the request extensions; anonymous requests are redirected to the login page with
/// the original path as `ReturnUrl`.
pub struct AuthMiddleware {
    keys: Rc<SessionKeys>,
}

impl AuthMiddleware {
    pub fn new(keys: SessionKeys) -> Self {
        Self {
            keys: Rc::new(keys),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            keys: Rc::clone(&self.keys),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    keys: Rc<SessionKeys>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = session_claims(&req, &self.keys);
        let anonymous = ANONYMOUS_PATHS.contains(&req.path());

        match claims {
            Some(claims) => {
                req.extensions_mut().insert(claims);
            }
            None if anonymous => {}
            None => {
                let location = login_redirect(req.path(), req.query_string());
                let response = HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish();
                return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}

fn session_claims(req: &ServiceRequest, keys: &SessionKeys) -> Option<Claims> {
    let token = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string)?,
    };

    match verify_token(keys, &token) {
        Ok(claims) => Some(claims),
        Err(err) => {
            log::debug!("Ignoring session token: {}", err);
            None
        }
    }
}

/// `/Account/Login?ReturnUrl=<path and query, percent-encoded>`
pub fn login_redirect(path: &str, query: &str) -> String {
    let target = if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    };
    format!("{}?ReturnUrl={}", LOGIN_PATH, urlencoding::encode(&target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::generate_token;
    use crate::models::User;
    use actix_web::{cookie::Cookie, http::StatusCode, test as actix_test, web, App};

    fn keys() -> SessionKeys {
        SessionKeys::new("middleware-test-secret", 60)
    }

    async fn whoami(req: actix_web::HttpRequest) -> HttpResponse {
        let name = req
            .extensions()
            .get::<Claims>()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "anonymous".to_string());
        HttpResponse::Ok().body(name)
    }

    #[test]
    fn test_login_redirect_encodes_return_url() {
        assert_eq!(
            login_redirect("/Tasks", "searchString=a b"),
            "/Account/Login?ReturnUrl=%2FTasks%3FsearchString%3Da%20b"
        );
        assert_eq!(login_redirect("/Users", ""), "/Account/Login?ReturnUrl=%2FUsers");
    }

    #[actix_rt::test]
    async fn test_anonymous_request_is_redirected() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(keys()))
                .route("/Tasks", web::get().to(whoami))
                .route("/health", web::get().to(whoami)),
        )
        .await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/Tasks").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/Account/Login?ReturnUrl=%2FTasks"
        );

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_session_cookie_and_bearer_are_accepted() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(keys()))
                .route("/Tasks", web::get().to(whoami)),
        )
        .await;
        let user = User {
            id: "u-1".to_string(),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            full_name: "Jane".to_string(),
            created_at: chrono::Utc::now(),
        };
        let token = generate_token(&keys(), &user).unwrap();

        let req = actix_test::TestRequest::get()
            .uri("/Tasks")
            .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "jane");

        let req = actix_test::TestRequest::get()
            .uri("/Tasks")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "jane");

        let req = actix_test::TestRequest::get()
            .uri("/Tasks")
            .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
}
