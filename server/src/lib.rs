pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

/// Embedded schema migrations from `server/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
