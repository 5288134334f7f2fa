use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::patch,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::api::dto::order_responses;
use crate::api::extract::ValidatedJson;
use crate::entities::{order, user};
use crate::error::ApiError;
use crate::middleware::logging::to_response;

pub fn admin_order_router() -> Router {
    Router::new().route("/orders/:id/", patch(patch_order_status))
}

async fn patch_order_status(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<PatchOrderStatus>,
) -> Result<Response, ApiError> {
    let status: order::Status = payload.status.parse().map_err(ApiError::Validation)?;

    let (current, owner) = order::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::not_found("order", format!("id {id}")))?;
    let previous = current.status;

    let mut entry: order::ActiveModel = current.into();
    entry.status = Set(status);
    entry.updated_at = Set(Utc::now());
    let updated = entry.update(&*db).await?;

    tracing::info!(order_id = id, from = %previous, to = %status, "Changed order status");

    let user_email = owner.map(|u| u.email).unwrap_or_default();
    let body = order_responses(&*db, vec![updated], &user_email)
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("order", format!("id {id}")))?;
    Ok(to_response((StatusCode::OK, Json(body)), Ok(())))
}

#[derive(Deserialize, Debug, Validate)]
struct PatchOrderStatus {
    #[validate(length(min = 1))]
    status: String,
}
