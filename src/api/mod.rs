pub mod admin;
pub mod dto;
pub mod extract;
pub mod pagination;
pub mod public;
pub mod user;

use axum::{middleware::from_fn, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::logging::logging_middleware;
use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .nest("/api", public_api_router().merge(user_api_router()))
        .nest("/api/admin", admin_api_router())
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(shared_db))
        .layer(Extension(config))
}
