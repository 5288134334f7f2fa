use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{patch, post},
    Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::SLUG_RE;
use crate::api::dto::{products_count_by, StyleResponse};
use crate::api::extract::ValidatedJson;
use crate::entities::{style, style::Entity as StyleEntity, product};
use crate::error::ApiError;
use crate::middleware::logging::to_response;

//ROUTERS
pub fn admin_style_router() -> Router {
    Router::new()
        .route("/styles/", post(create_style))
        .route(
            "/styles/:id/",
            patch(patch_style).delete(delete_style),
        )
}

//ROUTES
async fn create_style(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<CreateStyle>,
) -> Result<Response, ApiError> {
    let new_style = style::ActiveModel {
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description.unwrap_or_default()),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!(style_id = new_style.id, "Created style");
    Ok(to_response(
        (StatusCode::CREATED, Json(StyleResponse::new(new_style, 0))),
        Ok(()),
    ))
}

async fn patch_style(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<PatchStyle>,
) -> Result<Response, ApiError> {
    let mut entry: style::ActiveModel = StyleEntity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("style", format!("id {id}")))?
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
    let count = products_count_by(&*db, product::Column::StyleId)
        .await?
        .get(&updated.id)
        .copied()
        .unwrap_or(0);

    Ok(to_response(
        (StatusCode::OK, Json(StyleResponse::new(updated, count))),
        Ok(()),
    ))
}

/// Products of a deleted style stay listed without one.
async fn delete_style(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let result = StyleEntity::delete_by_id(id).exec(&*db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("style", format!("id {id}")));
    }

    tracing::info!(style_id = id, "Deleted style");
    Ok(to_response(StatusCode::NO_CONTENT, Ok(())))
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct CreateStyle {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(length(min = 1, max = 50), regex(path = *SLUG_RE))]
    slug: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug, Validate)]
struct PatchStyle {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    #[validate(length(min = 1, max = 50), regex(path = *SLUG_RE))]
    slug: Option<String>,
    description: Option<String>,
}
