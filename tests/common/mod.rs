#![allow(dead_code, unused_macros)]

use std::str::FromStr;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::StatusCode, test};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use taskapp::auth::{SessionKeys, SESSION_COOKIE};
use taskapp::identity::{CredentialStore, SqliteCredentialStore};
use taskapp::locale::Locale;
use taskapp::models::{NewAccount, TaskListViewModel};
use taskapp::{db, seed, AppState};

/// Test service wired like the server: session middleware around every route.
macro_rules! init_app {
    ($state:expr) => {{
        let state = $state.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(state.auth())
                .configure(move |cfg| state.configure(cfg)),
        )
        .await
    }};
}

pub const ADMIN: &str = seed::ADMIN_USERNAME;
pub const ADMIN_PASSWORD: &str = seed::ADMIN_PASSWORD;

/// A signed-in browser: its session cookie and the anti-forgery token of that session.
pub struct Session {
    pub cookie: Cookie<'static>,
    pub token: String,
}

/// Fresh in-memory store, migrated and seeded with the admin account.
///
/// A single connection that never expires keeps the in-memory database alive for the
/// whole test.
pub async fn test_state() -> AppState {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory store");
    db::initialize(&pool, false)
        .await
        .expect("Failed to migrate test store");

    let store: Arc<dyn CredentialStore> =
        Arc::new(SqliteCredentialStore::new(pool.clone()).with_hash_cost(4));
    seed::ensure_admin(store.as_ref())
        .await
        .expect("Failed to seed admin");

    AppState::new(
        pool,
        store,
        SessionKeys::new("integration-test-secret", 60),
        Locale::EnUs,
    )
}

pub async fn create_user(state: &AppState, username: &str, full_name: &str) -> String {
    state
        .store
        .create_account(NewAccount {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: full_name.to_string(),
            password: "Secret#Pass".to_string(),
        })
        .await
        .expect("Failed to create user")
        .id
}

pub async fn task_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await
        .expect("Failed to count tasks")
}

pub fn session_cookie_of<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
}

pub fn location_of<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Signs in through the login page and picks up the anti-forgery token from the
/// task listing.
pub async fn sign_in<S, B>(app: &S, username: &str, password: &str) -> Session
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/Account/Login")
        .set_form([("username", username), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "sign-in failed");
    let cookie = session_cookie_of(&resp).expect("sign-in did not set a session cookie");

    let listing = list_tasks(app, &cookie, "").await;
    Session {
        cookie,
        token: listing.antiforgery_token,
    }
}

pub async fn list_tasks<S, B>(app: &S, cookie: &Cookie<'static>, query: &str) -> TaskListViewModel
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::get()
        .uri(&format!("/Tasks{}", query))
        .cookie(cookie.clone())
        .to_request();
    test::call_and_read_body_json(app, req).await
}
