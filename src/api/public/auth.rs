use axum::{extract::Extension, http::StatusCode, response::Response, routing::post, Json, Router};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::{Validate, ValidationError};

use crate::api::extract::ValidatedJson;
use crate::config::Config;
use crate::entities::user::{self, hash_password, Role};
use crate::error::ApiError;
use crate::middleware::{auth::generate_token, logging::to_response};

pub fn auth_router() -> Router {
    Router::new()
        .route("/register/", post(register_user))
        .route("/login/", post(login))
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> Result<Response, ApiError> {
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(&*db)
        .await?;
    if taken.is_some() {
        return Err(ApiError::Validation(
            "A user with that username already exists".to_owned(),
        ));
    }

    let password = hash_password(&payload.password).map_err(ApiError::PasswordHash)?;
    let new_user = user::ActiveModel {
        username: Set(payload.username),
        email: Set(payload.email),
        password: Set(password),
        role: Set(Role::User),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!(user_id = new_user.id, "Registered user");
    Ok(to_response(
        (
            StatusCode::CREATED,
            Json(json!({
                "id": new_user.id,
                "username": new_user.username,
                "email": new_user.email,
            })),
        ),
        Ok(()),
    ))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    ValidatedJson(payload): ValidatedJson<UserLogin>,
) -> Result<Response, ApiError> {
    let model = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(&*db)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    model.check_hash(&payload.password).map_err(|_| ApiError::InvalidCredentials)?;

    let token = generate_token(&config, model.id, model.role)
        .map_err(|err| ApiError::TokenGeneration(err.to_string()))?;

    Ok(to_response(
        (StatusCode::OK, Json(json!({ "token": token }))),
        Ok(()),
    ))
}

#[derive(Deserialize, Debug, Validate)]
#[validate(schema(function = "passwords_match"))]
struct CreateUser {
    #[validate(length(min = 3, max = 150))]
    username: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    password: String,
    password2: String,
}

fn passwords_match(payload: &CreateUser) -> Result<(), ValidationError> {
    if payload.password == payload.password2 {
        Ok(())
    } else {
        Err(ValidationError::new("password_mismatch").with_message("Passwords do not match".into()))
    }
}

#[derive(Deserialize, Debug, Validate)]
struct UserLogin {
    #[validate(length(min = 1))]
    username: String,
    #[validate(length(min = 1))]
    password: String,
}
