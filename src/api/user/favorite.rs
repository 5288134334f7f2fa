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

use crate::api::dto::{product_summaries_by_id, FavoriteResponse};
use crate::api::extract::ValidatedJson;
use crate::api::pagination::{fetch_page, PageParams, PageQuery};
use crate::config::Config;
use crate::entities::favorite;
use crate::error::ApiError;
use crate::middleware::{auth::CurrentUser, logging::to_response};
use crate::services::favorites::{add_favorite, find_favorite, remove_favorite};

pub fn favorite_router() -> Router {
    Router::new()
        .route("/favorites/", get(get_favorites).post(create_favorite))
        .route("/favorites/:id/", get(get_favorite).delete(delete_favorite))
}

async fn get_favorites(
    Query(query): Query<PageQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let params = PageParams::from_query(&query, &config)?;
    let select = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user.id))
        .order_by_desc(favorite::Column::CreatedAt)
        .order_by_desc(favorite::Column::Id);
    let page = fetch_page(&*db, select, params).await?;

    let products =
        product_summaries_by_id(&*db, page.results.iter().map(|f| f.product_id).collect()).await?;
    let page = page.with_results(|entries| {
        entries
            .into_iter()
            .filter_map(|entry| {
                let product = products.get(&entry.product_id)?.clone();
                Some(FavoriteResponse::new(entry, product))
            })
            .collect()
    });

    Ok(to_response((StatusCode::OK, Json(page)), Ok(())))
}

async fn create_favorite(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateFavorite>,
) -> Result<Response, ApiError> {
    let (entry, created) = add_favorite(&*db, user.id, payload.product_id).await?;
    if created {
        tracing::info!(user_id = user.id, product_id = entry.product_id, "Added favorite");
    }

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    respond_with(&db, entry, status).await
}

async fn get_favorite(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let entry = find_favorite(&*db, user.id, id).await?;
    respond_with(&db, entry, StatusCode::OK).await
}

async fn delete_favorite(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    remove_favorite(&*db, user.id, id).await?;
    Ok(to_response(StatusCode::NO_CONTENT, Ok(())))
}

async fn respond_with(
    db: &DatabaseConnection,
    entry: favorite::Model,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let product = product_summaries_by_id(db, vec![entry.product_id])
        .await?
        .remove(&entry.product_id)
        .ok_or_else(|| ApiError::not_found("product", format!("id {}", entry.product_id)))?;

    Ok(to_response(
        (status, Json(FavoriteResponse::new(entry, product))),
        Ok(()),
    ))
}

#[derive(Deserialize, Debug, Validate)]
struct CreateFavorite {
    product_id: i32,
}
