use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use crate::api::dto::{products_count_by, CategoryResponse};
use crate::api::pagination::{fetch_page, PageParams, PageQuery};
use crate::config::Config;
use crate::entities::{category, product};
use crate::error::ApiError;
use crate::middleware::logging::to_response;

pub fn category_router() -> Router {
    Router::new()
        .route("/categories/", get(get_categories))
        .route("/categories/:slug/", get(get_category))
}

async fn get_categories(
    Query(query): Query<PageQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Response, ApiError> {
    let params = PageParams::from_query(&query, &config)?;
    let page = fetch_page(
        &*db,
        category::Entity::find().order_by_asc(category::Column::Name),
        params,
    )
    .await?;
    let counts = products_count_by(&*db, product::Column::CategoryId).await?;

    let page = page.map(|categ| {
        let count = counts.get(&categ.id).copied().unwrap_or(0);
        CategoryResponse::new(categ, count)
    });

    Ok(to_response((StatusCode::OK, Json(page)), Ok(())))
}

async fn get_category(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let categ = category::Entity::find()
        .filter(category::Column::Slug.eq(slug.as_str()))
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("category", format!("slug '{slug}'")))?;
    let counts = products_count_by(&*db, product::Column::CategoryId).await?;
    let count = counts.get(&categ.id).copied().unwrap_or(0);

    Ok(to_response(
        (StatusCode::OK, Json(CategoryResponse::new(categ, count))),
        Ok(()),
    ))
}
