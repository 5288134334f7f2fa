use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};
use std::sync::Arc;

use crate::api::dto::{
    products_count_by, summarize_products, CategoryResponse, ProductDetail, StyleResponse,
};
use crate::api::pagination::{fetch_page, PageParams};
use crate::config::Config;
use crate::entities::{category, product, style};
use crate::error::ApiError;
use crate::filter::{ProductFilter, ProductQuery};
use crate::middleware::logging::to_response;

pub const POPULAR_LIMIT: u64 = 12;

pub fn product_router() -> Router {
    Router::new()
        .route("/products/", get(get_products))
        .route("/products/featured/", get(get_featured))
        .route("/products/popular/", get(get_popular))
        .route("/products/:id/", get(get_product))
}

async fn get_products(
    Query(query): Query<ProductQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Response, ApiError> {
    let filter = ProductFilter::from_query(&query)?;
    list_page(&db, &config, &query, filter).await
}

async fn get_featured(
    Query(query): Query<ProductQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Response, ApiError> {
    let mut filter = ProductFilter::from_query(&query)?;
    filter.featured_only = true;
    list_page(&db, &config, &query, filter).await
}

async fn list_page(
    db: &DatabaseConnection,
    config: &Config,
    query: &ProductQuery,
    filter: ProductFilter,
) -> Result<Response, ApiError> {
    let params = PageParams::parse(query.page.as_deref(), query.page_size.as_deref(), config)?;
    let mut page = fetch_page(db, filter.select(), params).await?;
    let summaries = summarize_products(db, std::mem::take(&mut page.results)).await?;

    Ok(to_response(
        (StatusCode::OK, Json(page.with_results(|_| summaries))),
        Ok(()),
    ))
}

/// Most downloaded products matching the filters. Not paginated.
async fn get_popular(
    Query(query): Query<ProductQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let filter = ProductFilter::from_query(&query)?;
    let products = filter
        .filtered()
        .order_by_desc(product::Column::Downloads)
        .order_by_desc(product::Column::Id)
        .limit(POPULAR_LIMIT)
        .all(&*db)
        .await?;
    let summaries = summarize_products(&*db, products).await?;

    Ok(to_response((StatusCode::OK, Json(summaries)), Ok(())))
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let prod = product::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("product", format!("id {id}")))?;

    let categ = category::Entity::find_by_id(prod.category_id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("category", format!("id {}", prod.category_id)))?;
    let category_count = products_count_by(&*db, product::Column::CategoryId)
        .await?
        .get(&categ.id)
        .copied()
        .unwrap_or(0);

    let style = match prod.style_id {
        Some(style_id) => match style::Entity::find_by_id(style_id).one(&*db).await? {
            Some(value) => {
                let count = products_count_by(&*db, product::Column::StyleId)
                    .await?
                    .get(&value.id)
                    .copied()
                    .unwrap_or(0);
                Some(StyleResponse::new(value, count))
            }
            None => None,
        },
        None => None,
    };

    let detail = ProductDetail::new(prod, CategoryResponse::new(categ, category_count), style);
    Ok(to_response((StatusCode::OK, Json(detail)), Ok(())))
}
