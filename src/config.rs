use std::env;

use crate::error::AppError;
use crate::locale::Locale;

/// Runtime configuration read from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub server_port: u16,
    pub server_host: String,
    pub session_ttl_minutes: i64,
    pub locale: Locale,
    /// Drop every table before migrating. Only meant for throwaway demo environments.
    pub reset_database_on_start: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            session_secret: required("SESSION_SECRET")?,
            server_port: parsed("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            session_ttl_minutes: parsed("SESSION_TTL_MINUTES", 60)?,
            locale: match env::var("APP_LOCALE") {
                Ok(tag) => tag.parse()?,
                Err(_) => Locale::default(),
            },
            reset_database_on_start: parsed("RESET_DATABASE_ON_START", false)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Configuration(format!("{} must be set", key)))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
