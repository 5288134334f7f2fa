use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{patch, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{nullable, SLUG_RE};
use crate::api::dto::{summarize_products, ProductSummary};
use crate::api::extract::ValidatedJson;
use crate::entities::{
    category,
    product::{self, Entity as ProductEntity, Tags},
    style,
};
use crate::error::ApiError;
use crate::middleware::logging::to_response;

//ROUTERS
pub fn admin_product_router() -> Router {
    Router::new()
        .route("/products/", post(create_product))
        .route(
            "/products/:id/",
            patch(patch_product).delete(delete_product),
        )
}

//ROUTES
async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<CreateProduct>,
) -> Result<Response, ApiError> {
    ensure_category(&db, payload.category).await?;
    if let Some(style_id) = payload.style {
        ensure_style(&db, style_id).await?;
    }

    let now = Utc::now();
    let new_product = product::ActiveModel {
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description.unwrap_or_default()),
        category_id: Set(payload.category),
        style_id: Set(payload.style),
        price: Set(payload.price),
        image: Set(payload.image),
        author: Set(payload.author),
        rating: Set(payload.rating.unwrap_or_default()),
        reviews_count: Set(payload.reviews_count.unwrap_or_default()),
        downloads: Set(payload.downloads.unwrap_or_default()),
        tags: Set(Tags(payload.tags.unwrap_or_default())),
        is_featured: Set(payload.is_featured.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!(product_id = new_product.id, "Created product");
    let summary = summary_of(&db, new_product).await?;
    Ok(to_response((StatusCode::CREATED, Json(summary)), Ok(())))
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<PatchProduct>,
) -> Result<Response, ApiError> {
    let mut prod: product::ActiveModel = ProductEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("product", format!("id {id}")))?
        .into();

    if let Some(name) = payload.name {
        prod.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        prod.slug = Set(slug);
    }
    if let Some(description) = payload.description {
        prod.description = Set(description);
    }
    if let Some(category_id) = payload.category {
        ensure_category(&db, category_id).await?;
        prod.category_id = Set(category_id);
    }
    if let Some(style_id) = payload.style {
        if let Some(style_id) = style_id {
            ensure_style(&db, style_id).await?;
        }
        prod.style_id = Set(style_id);
    }
    if let Some(price) = payload.price {
        prod.price = Set(price);
    }
    if let Some(image) = payload.image {
        prod.image = Set(image);
    }
    if let Some(author) = payload.author {
        prod.author = Set(author);
    }
    if let Some(rating) = payload.rating {
        prod.rating = Set(rating);
    }
    if let Some(reviews_count) = payload.reviews_count {
        prod.reviews_count = Set(reviews_count);
    }
    if let Some(downloads) = payload.downloads {
        prod.downloads = Set(downloads);
    }
    if let Some(tags) = payload.tags {
        prod.tags = Set(Tags(tags));
    }
    if let Some(is_featured) = payload.is_featured {
        prod.is_featured = Set(is_featured);
    }
    prod.updated_at = Set(Utc::now());

    let updated = prod.update(&*db).await?;
    let summary = summary_of(&db, updated).await?;
    Ok(to_response((StatusCode::OK, Json(summary)), Ok(())))
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let result = ProductEntity::delete_by_id(id).exec(&*db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("product", format!("id {id}")));
    }

    tracing::info!(product_id = id, "Deleted product");
    Ok(to_response(StatusCode::NO_CONTENT, Ok(())))
}

//HELPERS
async fn ensure_category(db: &DatabaseConnection, id: i32) -> Result<(), ApiError> {
    match category::Entity::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::Validation(format!("No category with id {id} was found"))),
    }
}

async fn ensure_style(db: &DatabaseConnection, id: i32) -> Result<(), ApiError> {
    match style::Entity::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::Validation(format!("No style with id {id} was found"))),
    }
}

async fn summary_of(
    db: &DatabaseConnection,
    prod: product::Model,
) -> Result<ProductSummary, ApiError> {
    let id = prod.id;
    summarize_products(db, vec![prod])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("product", format!("id {id}")))
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    name: String,
    #[validate(length(min = 1, max = 255), regex(path = *SLUG_RE))]
    slug: String,
    description: Option<String>,
    category: i32,
    style: Option<i32>,
    #[validate(range(min = 0.0))]
    price: f64,
    #[validate(url)]
    image: String,
    #[validate(length(min = 1, max = 100))]
    author: String,
    #[validate(range(min = 0.0, max = 5.0))]
    rating: Option<f64>,
    #[validate(range(min = 0))]
    reviews_count: Option<i32>,
    #[validate(range(min = 0))]
    downloads: Option<i32>,
    tags: Option<Vec<String>>,
    is_featured: Option<bool>,
}

#[derive(Deserialize, Debug, Validate)]
struct PatchProduct {
    #[validate(length(min = 1, max = 255))]
    name: Option<String>,
    #[validate(length(min = 1, max = 255), regex(path = *SLUG_RE))]
    slug: Option<String>,
    description: Option<String>,
    category: Option<i32>,
    /// `null` detaches the product from its style.
    #[serde(default, deserialize_with = "nullable")]
    style: Option<Option<i32>>,
    #[validate(range(min = 0.0))]
    price: Option<f64>,
    #[validate(url)]
    image: Option<String>,
    #[validate(length(min = 1, max = 100))]
    author: Option<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    rating: Option<f64>,
    #[validate(range(min = 0))]
    reviews_count: Option<i32>,
    #[validate(range(min = 0))]
    downloads: Option<i32>,
    tags: Option<Vec<String>>,
    is_featured: Option<bool>,
}
