//! Wiring shared by the server binary and the integration tests.

use std::sync::Arc;

use actix_web::web;
use sqlx::SqlitePool;

use crate::auth::{AuthMiddleware, SessionKeys};
use crate::config::Config;
use crate::identity::{store::SqliteCredentialStore, CredentialStore};
use crate::locale::Locale;
use crate::routes;

/// Everything a worker needs to serve requests. Cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub store: Arc<dyn CredentialStore>,
    pub keys: SessionKeys,
    pub locale: Locale,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        store: Arc<dyn CredentialStore>,
        keys: SessionKeys,
        locale: Locale,
    ) -> Self {
        Self {
            pool,
            store,
            keys,
            locale,
        }
    }

    pub fn from_config(config: &Config, pool: SqlitePool) -> Self {
        let store = Arc::new(SqliteCredentialStore::new(pool.clone()));
        Self::new(
            pool,
            store,
            SessionKeys::new(config.session_secret.clone(), config.session_ttl_minutes),
            config.locale,
        )
    }

    /// Registers shared data and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::from(Arc::clone(&self.store)))
            .app_data(web::Data::new(self.keys.clone()))
            .app_data(web::Data::new(self.locale));
        routes::config(cfg);
    }

    pub fn auth(&self) -> AuthMiddleware {
        AuthMiddleware::new(self.keys.clone())
    }
}
