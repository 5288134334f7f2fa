use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;

use crate::config::Config;
use crate::entities::user::{self, Role};
use crate::error::ApiError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub exp: usize,
}

/// Identity resolved from the bearer token, attached to every authenticated request.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Token expired or malformed")]
    InvalidToken,
    #[error("Failed to generate token")]
    GenerationFail,
}

/// Rejects requests without a valid token for a user holding at least `required` role.
pub async fn auth_middleware(
    State(required): State<Role>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "));

    let Some(token) = token else {
        return ApiError::Unauthorized.into_response();
    };

    let claims = match validate_token(&config.jwt_secret, token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected bearer token");
            return ApiError::Unauthorized.into_response();
        }
    };

    let current = match load_user(&db, &claims).await {
        Ok(current) => current,
        Err(err) => return err.into_response(),
    };

    if current.role < required {
        return ApiError::Forbidden.into_response();
    }

    req.extensions_mut().insert(current);
    next.run(req).await
}

async fn load_user(db: &DatabaseConnection, claims: &Claims) -> Result<CurrentUser, ApiError> {
    let role = Role::from_str(&claims.role).map_err(|_| ApiError::Unauthorized)?;
    let model = user::Entity::find_by_id(claims.user_id)
        .one(db)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if model.role != role {
        tracing::debug!(error = %AuthMiddlewareError::InvalidUserOrRole, user_id = model.id);
        return Err(ApiError::Unauthorized);
    }

    Ok(CurrentUser {
        id: model.id,
        username: model.username,
        email: model.email,
        role: model.role,
    })
}

pub fn generate_token(
    config: &Config,
    user_id: i32,
    role: Role,
) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        user_id,
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub fn validate_token(secret: &str, token: &str) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthMiddlewareError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_owned(),
            database_max_connections: 1,
            bind_addr: "127.0.0.1:0".to_owned(),
            jwt_secret: "unit-secret".to_owned(),
            jwt_ttl_hours: 1,
            page_size: 12,
            max_page_size: 100,
            admin: None,
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let config = config();
        let token = generate_token(&config, 7, Role::Admin).unwrap();
        let claims = validate_token(&config.jwt_secret, &token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = config();
        let token = generate_token(&config, 7, Role::User).unwrap();
        assert!(validate_token("another-secret", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut config = config();
        config.jwt_ttl_hours = -2;
        let token = generate_token(&config, 7, Role::User).unwrap();
        assert!(validate_token(&config.jwt_secret, &token).is_err());
    }
}
