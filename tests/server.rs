mod common;

use std::net::TcpListener;
use std::time::Duration;

use actix_web::{rt, App, HttpServer};
use reqwest::{redirect, StatusCode};

use common::test_state;

#[actix_rt::test]
async fn test_live_server_redirects_anonymous_browsers() {
    let state = test_state().await;

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server_state = state.clone();
    let server = HttpServer::new(move || {
        let state = server_state.clone();
        App::new()
            .wrap(state.auth())
            .configure(move |cfg| state.configure(cfg))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);
    // Give the worker a moment to start accepting.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();
    let base = format!("http://127.0.0.1:{}", port);

    let resp = client.get(format!("{}/Tasks", base)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers()["location"].to_str().unwrap(),
        "/Account/Login?ReturnUrl=%2FTasks"
    );

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let resp = client
        .post(format!("{}/Account/Login", base))
        .form(&[("username", "admin"), ("password", "Admin@ICAD!")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(resp
        .headers()
        .get_all("set-cookie")
        .iter()
        .any(|value| value.to_str().unwrap_or_default().starts_with("TaskApp.Session=")));

    handle.stop(true).await;
}
