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

use super::SLUG_RE;
use crate::api::dto::{products_count_by, CategoryResponse};
use crate::api::extract::ValidatedJson;
use crate::entities::{category, category::Entity as CategoryEntity, product};
use crate::error::ApiError;
use crate::middleware::logging::to_response;

//ROUTERS
pub fn admin_category_router() -> Router {
    Router::new()
        .route("/categories/", post(create_category))
        .route(
            "/categories/:id/",
            patch(patch_category).delete(delete_category),
        )
}

//ROUTES
async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<CreateCategory>,
) -> Result<Response, ApiError> {
    let new_category = category::ActiveModel {
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description.unwrap_or_default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!(category_id = new_category.id, "Created category");
    Ok(to_response(
        (StatusCode::CREATED, Json(CategoryResponse::new(new_category, 0))),
        Ok(()),
    ))
}

async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<PatchCategory>,
) -> Result<Response, ApiError> {
    let mut entry: category::ActiveModel = CategoryEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("category", format!("id {id}")))?
        .into();

    if let Some(name) = payload.name {
        entry.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        entry.slug = Set(slug);
    }
    if let Some(description) = payload.description {
        entry.description = Set(description);
    }

    let updated = entry.update(&*db).await?;
    let count = products_count_by(&*db, product::Column::CategoryId)
        .await?
        .get(&updated.id)
        .copied()
        .unwrap_or(0);

    Ok(to_response(
        (StatusCode::OK, Json(CategoryResponse::new(updated, count))),
        Ok(()),
    ))
}

/// Deleting a category removes its products with it.
async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let result = CategoryEntity::delete_by_id(id).exec(&*db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("category", format!("id {id}")));
    }

    tracing::info!(category_id = id, "Deleted category");
    Ok(to_response(StatusCode::NO_CONTENT, Ok(())))
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(length(min = 1, max = 50), regex(path = *SLUG_RE))]
    slug: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug, Validate)]
struct PatchCategory {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    #[validate(length(min = 1, max = 50), regex(path = *SLUG_RE))]
    slug: Option<String>,
    description: Option<String>,
}
