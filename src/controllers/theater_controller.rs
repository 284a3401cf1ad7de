use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, from_document, oid::ObjectId, Document};
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::theater_model::{CreateTheaterRequest, Theater, TheaterDetail, TheaterUpdate};
use crate::models::Status;
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id, to_set_document};

/// Filter matching rooms that block their theater's soft delete.
fn active_rooms_query(theater_id: &ObjectId) -> Document {
    doc! { "theater_id": theater_id, "status": Status::Active.as_str() }
}

pub async fn load_theaters(
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Vec<Theater>>, ApiError> {
    let theaters = db(&client).collection::<Theater>("theaters");
    let mut cursor = theaters.find(doc! {}, None).await?;
    let mut result = Vec::new();
    while let Some(theater) = cursor.try_next().await? {
        result.push(theater);
    }
    Ok(Json(result))
}

pub async fn list_theaters(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<Theater>>, ApiError> {
    let theaters = db(&client).collection::<Theater>("theaters");
    Ok(Json(find_page(&theaters, &request).await?))
}

pub async fn load_theater_with_rooms(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<TheaterDetail>, ApiError> {
    let theater_id = parse_object_id(&id_str)?;
    let theaters = db(&client).collection::<Theater>("theaters");

    let pipeline = vec![
        doc! { "$match": { "_id": theater_id } },
        doc! {
            "$lookup": {
                "from": "rooms",
                "localField": "_id",
                "foreignField": "theater_id",
                "as": "rooms"
            }
        },
    ];

    let mut cursor = theaters.aggregate(pipeline, None).await?;
    match cursor.try_next().await? {
        Some(document) => Ok(Json(from_document::<TheaterDetail>(document)?)),
        None => Err(ApiError::NotFound("theater not found".to_string())),
    }
}

pub async fn add_theater(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<CreateTheaterRequest>,
) -> Result<(StatusCode, Json<Theater>), ApiError> {
    let theaters = db(&client).collection::<Theater>("theaters");
    let mut theater = Theater {
        id: None,
        name: payload.name,
        address: payload.address,
        status: Status::Active,
    };
    let insert_result = theaters.insert_one(&theater, None).await?;
    theater.id = insert_result.inserted_id.as_object_id();
    Ok((StatusCode::CREATED, Json(theater)))
}

pub async fn update_theater(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<TheaterUpdate>,
) -> Result<Json<TheaterUpdate>, ApiError> {
    let theater_id = parse_object_id(&id_str)?;
    let theaters = db(&client).collection::<Theater>("theaters");

    let set_doc = to_set_document(&payload);
    if set_doc.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }

    let update_result = theaters
        .update_one(doc! { "_id": theater_id }, doc! { "$set": set_doc }, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("theater not found".to_string()));
    }
    Ok(Json(payload))
}

/// Soft delete, refused while the theater still has active rooms.
pub async fn delete_theater(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Value>, ApiError> {
    let theater_id = parse_object_id(&id_str)?;
    let database = db(&client);
    let theaters = database.collection::<Theater>("theaters");
    let rooms = database.collection::<Document>("rooms");

    let active_rooms = rooms
        .count_documents(active_rooms_query(&theater_id), None)
        .await?;
    if active_rooms > 0 {
        return Err(ApiError::BadRequest(
            "theater still has active rooms".to_string(),
        ));
    }

    let update_result = theaters
        .update_one(
            doc! { "_id": theater_id },
            doc! { "$set": { "status": Status::Inactive.as_str() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("theater not found".to_string()));
    }
    Ok(Json(json!({ "message": "theater deactivated" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_guard_counts_only_active_rooms_of_the_theater() {
        let theater_id = ObjectId::new();
        let query = active_rooms_query(&theater_id);

        assert_eq!(query.get_object_id("theater_id").unwrap(), theater_id);
        assert_eq!(query.get_str("status").unwrap(), "active");
        assert_eq!(query.len(), 2);
    }
}
