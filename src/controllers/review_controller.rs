use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::FindOptions;
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;
use crate::models::review_model::{CreateReviewRequest, Review};
use crate::models::Status;
use crate::utils::{db, parse_object_id};

pub async fn load_movie_reviews(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let movie_id = parse_object_id(&id_str)?;
    let reviews = db(&client).collection::<Review>("reviews");

    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();
    let mut cursor = reviews
        .find(
            doc! { "movie_id": movie_id, "status": Status::Active.as_str() },
            options,
        )
        .await?;
    let mut result = Vec::new();
    while let Some(review) = cursor.try_next().await? {
        result.push(review);
    }
    Ok(Json(result))
}

pub async fn add_review(
    Extension(client): Extension<Arc<Client>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let movie_id = parse_object_id(&payload.movie_id)?;
    let database = db(&client);

    let movies = database.collection::<Document>("movies");
    if movies
        .find_one(doc! { "_id": movie_id, "status": Status::Active.as_str() }, None)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("movie not found".to_string()));
    }

    let reviews = database.collection::<Review>("reviews");
    let mut review = Review {
        id: None,
        movie_id: Some(movie_id),
        user_id: Some(auth.id),
        rating: payload.rating,
        comment: payload.comment,
        status: Status::Active,
        created_at: DateTime::now(),
    };
    let insert_result = reviews.insert_one(&review, None).await?;
    review.id = insert_result.inserted_id.as_object_id();
    Ok((StatusCode::CREATED, Json(review)))
}

/// Soft delete by the author or an admin.
pub async fn delete_review(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let review_id = parse_object_id(&id_str)?;
    let reviews = db(&client).collection::<Review>("reviews");

    let review = reviews
        .find_one(doc! { "_id": review_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;

    if !auth.role.is_admin() && review.user_id != Some(auth.id) {
        return Err(ApiError::Forbidden(
            "review belongs to another user".to_string(),
        ));
    }

    reviews
        .update_one(
            doc! { "_id": review_id },
            doc! { "$set": { "status": Status::Inactive.as_str() } },
            None,
        )
        .await?;
    Ok(Json(json!({ "message": "review removed" })))
}
