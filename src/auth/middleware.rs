use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use std::sync::Arc;

use crate::auth::jwt::{decode_token, subject_id};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::user_model::{Role, User, UserStatus};
use crate::utils::db;

/// Authenticated caller, inserted into request extensions by
/// `verify_token` and read back by handlers and the role gates.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub username: String,
    pub role: Role,
}

fn bearer_token(request: &Request) -> Result<&str, ApiError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))
}

pub async fn verify_token(
    Extension(client): Extension<Arc<Client>>,
    Extension(config): Extension<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)?;
    let claims = decode_token(token, &config.jwt_secret)?;
    let user_id = subject_id(&claims)?;

    // The account may have been locked or removed since the token was
    // issued, so the current record is authoritative, not the claims.
    let users = db(&client).collection::<User>("users");
    let user = users
        .find_one(doc! { "_id": user_id }, None)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("unknown account".to_string()))?;

    if user.status != UserStatus::Active {
        return Err(ApiError::Forbidden(format!(
            "account is {}",
            user.status.as_str()
        )));
    }

    request.extensions_mut().insert(AuthUser {
        id: user_id,
        username: user.username,
        role: user.role,
    });
    Ok(next.run(request).await)
}

pub async fn require_staff(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.role.is_staff() {
        return Err(ApiError::Forbidden("staff access required".to_string()));
    }
    Ok(next.run(request).await)
}

pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.role.is_admin() {
        return Err(ApiError::Forbidden("admin access required".to_string()));
    }
    Ok(next.run(request).await)
}
