use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::api::dto::order_responses;
use crate::api::extract::OptionalValidatedJson;
use crate::api::pagination::{fetch_page, PageParams, PageQuery};
use crate::config::Config;
use crate::entities::order;
use crate::error::ApiError;
use crate::middleware::{auth::CurrentUser, logging::to_response};
use crate::services::checkout::checkout;

pub fn order_router() -> Router {
    Router::new()
        .route("/orders/", get(get_orders).post(create_order))
        .route("/orders/:id/", get(get_order))
}

async fn get_orders(
    Query(query): Query<PageQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let params = PageParams::from_query(&query, &config)?;
    let select = order::Entity::find()
        .filter(order::Column::UserId.eq(user.id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id);
    let mut page = fetch_page(&*db, select, params).await?;
    let orders = order_responses(&*db, std::mem::take(&mut page.results), &user.email).await?;

    Ok(to_response(
        (StatusCode::OK, Json(page.with_results(|_| orders))),
        Ok(()),
    ))
}

async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
    OptionalValidatedJson(payload): OptionalValidatedJson<CreateOrder>,
) -> Result<Response, ApiError> {
    let (order, _) = checkout(&db, &user, payload.email).await?;

    let body = order_responses(&*db, vec![order], &user.email)
        .await?
        .pop()
        .ok_or_else(|| ApiError::Db("created order could not be read back".to_owned()))?;
    Ok(to_response((StatusCode::CREATED, Json(body)), Ok(())))
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let order = order::Entity::find_by_id(id)
        .filter(order::Column::UserId.eq(user.id))
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("order", format!("id {id}")))?;

    let body = order_responses(&*db, vec![order], &user.email)
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("order", format!("id {id}")))?;
    Ok(to_response((StatusCode::OK, Json(body)), Ok(())))
}

#[derive(Deserialize, Debug, Default, Validate)]
struct CreateOrder {
    #[validate(email)]
    email: Option<String>,
}
