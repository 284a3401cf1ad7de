use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use mongodb::bson::{doc, DateTime};
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::models::user_model::{
    CreateUserRequest, User, UserResponse, UserStatus, UserStatusPatch, UserUpdate,
};
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id, to_set_document};

pub async fn list_users(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<UserResponse>>, ApiError> {
    let users = db(&client).collection::<UserResponse>("users");
    Ok(Json(find_page(&users, &request).await?))
}

pub async fn get_user(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_object_id(&id_str)?;
    let users = db(&client).collection::<UserResponse>("users");
    let user = users
        .find_one(doc! { "_id": user_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(Json(user))
}

/// Admin-side account creation, used for staff point-of-sale accounts.
pub async fn add_user(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let users = db(&client).collection::<User>("users");
    let taken = users
        .count_documents(
            doc! { "$or": [ { "username": &payload.username }, { "email": &payload.email } ] },
            None,
        )
        .await?;
    if taken > 0 {
        return Err(ApiError::BadRequest(
            "username or email is already registered".to_string(),
        ));
    }

    let now = DateTime::now();
    let mut user = User {
        id: None,
        username: payload.username,
        email: payload.email,
        password: hash_password(&payload.password)?,
        role: payload.role,
        status: UserStatus::Active,
        otp_code: None,
        otp_expires_at: None,
        otp_requested_at: None,
        created_at: now,
        updated_at: now,
    };

    let insert_result = users.insert_one(&user, None).await?;
    user.id = insert_result.inserted_id.as_object_id();
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn update_user(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_object_id(&id_str)?;
    let users = db(&client).collection::<User>("users");

    if let Some(email) = &payload.email {
        let taken = users
            .count_documents(
                doc! { "email": email, "_id": { "$ne": user_id } },
                None,
            )
            .await?;
        if taken > 0 {
            return Err(ApiError::BadRequest(
                "email is already registered".to_string(),
            ));
        }
    }

    let mut set_doc = to_set_document(&json!({ "email": payload.email, "role": payload.role }));
    if let Some(password) = &payload.password {
        set_doc.insert("password", hash_password(password)?);
    }
    if set_doc.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }
    set_doc.insert("updated_at", DateTime::now());

    let update_result = users
        .update_one(doc! { "_id": user_id }, doc! { "$set": set_doc }, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("user not found".to_string()));
    }
    Ok(Json(json!({ "message": "user updated" })))
}

pub async fn patch_user_status(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<UserStatusPatch>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_object_id(&id_str)?;
    let users = db(&client).collection::<User>("users");

    let update_result = users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "status": payload.status.as_str(), "updated_at": DateTime::now() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("user not found".to_string()));
    }
    Ok(Json(json!({ "message": "user status updated" })))
}

/// Soft delete: the account is suspended, never removed.
pub async fn delete_user(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_object_id(&id_str)?;
    let users = db(&client).collection::<User>("users");

    let update_result = users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "status": UserStatus::Suspended.as_str(), "updated_at": DateTime::now() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("user not found".to_string()));
    }
    Ok(Json(json!({ "message": "user suspended" })))
}
