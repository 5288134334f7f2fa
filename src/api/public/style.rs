use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use crate::api::dto::{products_count_by, StyleResponse};
use crate::api::pagination::{fetch_page, PageParams, PageQuery};
use crate::config::Config;
use crate::entities::{product, style};
use crate::error::ApiError;
use crate::middleware::logging::to_response;

pub fn style_router() -> Router {
    Router::new()
        .route("/styles/", get(get_styles))
        .route("/styles/:slug/", get(get_style))
}

async fn get_styles(
    Query(query): Query<PageQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Response, ApiError> {
    let params = PageParams::from_query(&query, &config)?;
    let page = fetch_page(
        &*db,
        style::Entity::find().order_by_asc(style::Column::Name),
        params,
    )
    .await?;
    let counts = products_count_by(&*db, product::Column::StyleId).await?;

    let page = page.map(|value| {
        let count = counts.get(&value.id).copied().unwrap_or(0);
        StyleResponse::new(value, count)
    });

    Ok(to_response((StatusCode::OK, Json(page)), Ok(())))
}

async fn get_style(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let value = style::Entity::find()
        .filter(style::Column::Slug.eq(slug.as_str()))
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("style", format!("slug '{slug}'")))?;
    let count = products_count_by(&*db, product::Column::StyleId)
        .await?
        .get(&value.id)
        .copied()
        .unwrap_or(0);

    Ok(to_response(
        (StatusCode::OK, Json(StyleResponse::new(value, count))),
        Ok(()),
    ))
}
