pub mod category;
pub mod order;
pub mod product;
pub mod style;

use axum::{middleware::from_fn_with_state, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::entities::user::Role;
use crate::middleware::auth::auth_middleware;
use category::admin_category_router;
use order::admin_order_router;
use product::admin_product_router;
use style::admin_style_router;

pub(crate) static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

pub fn admin_api_router() -> Router {
    Router::new()
        .merge(admin_category_router())
        .merge(admin_style_router())
        .merge(admin_product_router())
        .merge(admin_order_router())
        .route_layer(from_fn_with_state(Role::Admin, auth_middleware))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
