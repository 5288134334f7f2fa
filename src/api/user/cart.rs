use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::api::dto::{product_summaries_by_id, CartItemResponse};
use crate::api::extract::ValidatedJson;
use crate::api::pagination::{fetch_page, PageParams, PageQuery};
use crate::config::Config;
use crate::entities::cart;
use crate::error::ApiError;
use crate::middleware::{auth::CurrentUser, logging::to_response};
use crate::services::cart::{
    add_to_cart, cart_total, clear_cart, find_cart_item, remove_cart_item, set_quantity,
};

//ROUTERS
pub fn cart_router() -> Router {
    Router::new()
        .route("/cart/", get(get_cart).post(add_product))
        .route("/cart/clear/", delete(clear))
        .route("/cart/total/", get(total))
        .route(
            "/cart/:id/",
            get(get_entry).patch(patch_entry).delete(remove_product),
        )
}

//Routes
async fn get_cart(
    Query(query): Query<PageQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let params = PageParams::from_query(&query, &config)?;
    let select = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user.id))
        .order_by_asc(cart::Column::CreatedAt)
        .order_by_asc(cart::Column::Id);
    let page = fetch_page(&*db, select, params).await?;

    let products =
        product_summaries_by_id(&*db, page.results.iter().map(|e| e.product_id).collect()).await?;
    let page = page.with_results(|entries| {
        entries
            .into_iter()
            .filter_map(|entry| {
                let product = products.get(&entry.product_id)?.clone();
                Some(CartItemResponse::new(entry, product))
            })
            .collect()
    });

    Ok(to_response((StatusCode::OK, Json(page)), Ok(())))
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddProduct>,
) -> Result<Response, ApiError> {
    let (entry, created) =
        add_to_cart(&*db, user.id, payload.product_id, payload.quantity).await?;
    tracing::info!(
        user_id = user.id,
        product_id = entry.product_id,
        quantity = entry.quantity,
        created,
        "Added product to cart"
    );

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    respond_with(&db, entry, status).await
}

async fn get_entry(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let entry = find_cart_item(&*db, user.id, id).await?;
    respond_with(&db, entry, StatusCode::OK).await
}

async fn patch_entry(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<PatchCart>,
) -> Result<Response, ApiError> {
    let entry = set_quantity(&*db, user.id, id, payload.quantity).await?;
    respond_with(&db, entry, StatusCode::OK).await
}

async fn remove_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    remove_cart_item(&*db, user.id, id).await?;
    Ok(to_response(StatusCode::NO_CONTENT, Ok(())))
}

async fn clear(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let removed = clear_cart(&*db, user.id).await?;
    tracing::info!(user_id = user.id, removed, "Cleared cart");
    Ok(to_response(StatusCode::NO_CONTENT, Ok(())))
}

async fn total(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let total = cart_total(&*db, user.id).await?;
    Ok(to_response((StatusCode::OK, Json(total)), Ok(())))
}

async fn respond_with(
    db: &DatabaseConnection,
    entry: cart::Model,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let product = product_summaries_by_id(db, vec![entry.product_id])
        .await?
        .remove(&entry.product_id)
        .ok_or_else(|| ApiError::not_found("product", format!("id {}", entry.product_id)))?;

    Ok(to_response(
        (status, Json(CartItemResponse::new(entry, product))),
        Ok(()),
    ))
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct AddProduct {
    product_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 10000, message = "Quantity should be between 1 and 10000"))]
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize, Debug, Validate)]
struct PatchCart {
    #[validate(range(min = 1, max = 10000, message = "Quantity should be between 1 and 10000"))]
    quantity: i32,
}
