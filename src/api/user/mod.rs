pub mod cart;
pub mod favorite;
pub mod order;

use axum::{middleware::from_fn_with_state, Router};

use crate::entities::user::Role;
use crate::middleware::auth::auth_middleware;
use cart::cart_router;
use favorite::favorite_router;
use order::order_router;

pub fn user_api_router() -> Router {
    Router::new()
        .merge(favorite_router())
        .merge(cart_router())
        .merge(order_router())
        .route_layer(from_fn_with_state(Role::User, auth_middleware))
}
