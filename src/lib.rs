pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::create_api_router;
use crate::config::Config;

/// The whole HTTP application over an already prepared database.
pub fn create_app(db: DatabaseConnection, config: Config) -> Router {
    create_api_router(Arc::new(db), Arc::new(config))
}
