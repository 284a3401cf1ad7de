use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, from_document};
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::movie_model::{CreateMovieRequest, Movie, MovieDetail, MovieUpdate};
use crate::models::Status;
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id, to_set_document};

/// Public catalog: active movies only.
pub async fn load_movies(
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let movies = db(&client).collection::<Movie>("movies");
    let mut cursor = movies
        .find(doc! { "status": Status::Active.as_str() }, None)
        .await?;
    let mut result = Vec::new();
    while let Some(movie) = cursor.try_next().await? {
        result.push(movie);
    }
    Ok(Json(result))
}

pub async fn list_movies(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<Movie>>, ApiError> {
    let movies = db(&client).collection::<Movie>("movies");
    Ok(Json(find_page(&movies, &request).await?))
}

pub async fn load_movie_with_showtimes(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<MovieDetail>, ApiError> {
    let movie_id = parse_object_id(&id_str)?;
    let movies = db(&client).collection::<Movie>("movies");

    let pipeline = vec![
        doc! { "$match": { "_id": movie_id } },
        doc! {
            "$lookup": {
                "from": "showtimes",
                "let": { "movie_id": "$_id" },
                "pipeline": [
                    { "$match": {
                        "$expr": { "$eq": [ "$movie_id", "$$movie_id" ] },
                        "status": Status::Active.as_str(),
                    }},
                    { "$sort": { "start_time": 1 } },
                ],
                "as": "showtimes"
            }
        },
    ];

    let mut cursor = movies.aggregate(pipeline, None).await?;
    match cursor.try_next().await? {
        Some(document) => Ok(Json(from_document::<MovieDetail>(document)?)),
        None => Err(ApiError::NotFound("movie not found".to_string())),
    }
}

pub async fn add_movie(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    if payload.duration <= 0 {
        return Err(ApiError::BadRequest(
            "duration must be a positive number of minutes".to_string(),
        ));
    }

    let movies = db(&client).collection::<Movie>("movies");
    let mut movie = Movie {
        id: None,
        title: payload.title,
        genres: payload.genres,
        duration: payload.duration,
        description: payload.description,
        poster: payload.poster,
        status: Status::Active,
    };
    let insert_result = movies.insert_one(&movie, None).await?;
    movie.id = insert_result.inserted_id.as_object_id();
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<MovieUpdate>,
) -> Result<Json<MovieUpdate>, ApiError> {
    let movie_id = parse_object_id(&id_str)?;
    let movies = db(&client).collection::<Movie>("movies");

    if let Some(duration) = payload.duration {
        if duration <= 0 {
            return Err(ApiError::BadRequest(
                "duration must be a positive number of minutes".to_string(),
            ));
        }
    }

    let set_doc = to_set_document(&payload);
    if set_doc.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }

    let update_result = movies
        .update_one(doc! { "_id": movie_id }, doc! { "$set": set_doc }, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("movie not found".to_string()));
    }
    Ok(Json(payload))
}

pub async fn delete_movie(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Value>, ApiError> {
    let movie_id = parse_object_id(&id_str)?;
    let movies = db(&client).collection::<Movie>("movies");

    let update_result = movies
        .update_one(
            doc! { "_id": movie_id },
            doc! { "$set": { "status": Status::Inactive.as_str() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("movie not found".to_string()));
    }
    Ok(Json(json!({ "message": "movie deactivated" })))
}
