#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};

use common::{location_of, test_state};
use taskapp::seed::{self, SeedOutcome};

#[test_log::test(actix_rt::test)]
async fn test_seeding_twice_keeps_one_admin() {
    // test_state has already seeded once.
    let state = test_state().await;

    let outcome = seed::ensure_admin(state.store.as_ref()).await.unwrap();
    assert_eq!(outcome, SeedOutcome::AlreadyExists);

    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?1")
        .bind(seed::ADMIN_USERNAME)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(admins, 1);

    let admin = state
        .store
        .verify_credential(seed::ADMIN_USERNAME, seed::ADMIN_PASSWORD)
        .await
        .unwrap()
        .expect("seeded admin can sign in");
    assert_eq!(admin.email, seed::ADMIN_EMAIL);
    assert_eq!(admin.full_name, seed::ADMIN_FULL_NAME);
}

#[test_log::test(actix_rt::test)]
async fn test_reset_reseeds_from_scratch() {
    let state = test_state().await;

    taskapp::db::initialize(&state.pool, true).await.unwrap();
    assert!(state.store.find_by_name(seed::ADMIN_USERNAME).await.unwrap().is_none());

    let outcome = seed::ensure_admin(state.store.as_ref()).await.unwrap();
    assert_eq!(outcome, SeedOutcome::Created);
}

#[actix_rt::test]
async fn test_root_and_health_routes() {
    let state = test_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let session = common::sign_in(&app, common::ADMIN, common::ADMIN_PASSWORD).await;
    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session.cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&resp), "/Tasks");
}
