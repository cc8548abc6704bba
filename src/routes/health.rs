use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

/// Health check endpoint
///
/// Reports `ok` when the store answers a trivial query and `degraded` otherwise.
/// Always answers 200 so a broken store stays visible instead of failing the probe.
#[get("/health")]
pub async fn health(pool: web::Data<SqlitePool>) -> impl Responder {
    let database = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => "connected",
        Err(err) => {
            log::warn!("Health check could not reach the database: {}", err);
            "disconnected"
        }
    };

    HttpResponse::Ok().json(json!({
        "status": if database == "connected" { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
