pub mod auth;
pub mod category;
pub mod product;
pub mod style;

use axum::Router;

use auth::auth_router;
use category::category_router;
use product::product_router;
use style::style_router;

pub fn public_api_router() -> Router {
    Router::new()
        .merge(auth_router())
        .merge(category_router())
        .merge(style_router())
        .merge(product_router())
}
