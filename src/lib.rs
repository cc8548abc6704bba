#![doc = "The `taskapp` library crate."]
#![doc = ""]
#![doc = "Task tracking with accounts: storage, identity, sessions, routing and error"]
#![doc = "handling. The binary (`main.rs`) only reads configuration, prepares the store and"]
#![doc = "serves [`app::AppState`]."]

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod locale;
pub mod models;
pub mod routes;
pub mod security;
pub mod seed;

pub use crate::app::AppState;
pub use crate::error::AppError;
