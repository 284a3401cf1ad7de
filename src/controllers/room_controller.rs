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
use crate::models::room_model::{CreateRoomRequest, Room, RoomDetail, RoomUpdate};
use crate::models::seat_model::Seat;
use crate::models::Status;
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id, to_set_document};

/// Filter matching a room's active seats, used both for the seat
/// listing and as the guard that blocks the room's soft delete.
fn active_seats_query(room_id: &ObjectId) -> Document {
    doc! { "room_id": room_id, "status": Status::Active.as_str() }
}

pub async fn list_rooms(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<Room>>, ApiError> {
    let rooms = db(&client).collection::<Room>("rooms");
    Ok(Json(find_page(&rooms, &request).await?))
}

pub async fn load_room_with_seats(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<RoomDetail>, ApiError> {
    let room_id = parse_object_id(&id_str)?;
    let rooms = db(&client).collection::<Room>("rooms");

    let pipeline = vec![
        doc! { "$match": { "_id": room_id } },
        doc! {
            "$lookup": {
                "from": "seats",
                "localField": "_id",
                "foreignField": "room_id",
                "as": "seats"
            }
        },
    ];

    let mut cursor = rooms.aggregate(pipeline, None).await?;
    match cursor.try_next().await? {
        Some(document) => Ok(Json(from_document::<RoomDetail>(document)?)),
        None => Err(ApiError::NotFound("room not found".to_string())),
    }
}

pub async fn load_room_seats(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Vec<Seat>>, ApiError> {
    let room_id = parse_object_id(&id_str)?;
    let seats = db(&client).collection::<Seat>("seats");

    let mut cursor = seats.find(active_seats_query(&room_id), None).await?;
    let mut result = Vec::new();
    while let Some(seat) = cursor.try_next().await? {
        result.push(seat);
    }
    Ok(Json(result))
}

pub async fn add_room(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let theater_id = parse_object_id(&payload.theater_id)?;
    let database = db(&client);

    let theaters = database.collection::<Document>("theaters");
    let theater = theaters
        .find_one(
            doc! { "_id": theater_id, "status": Status::Active.as_str() },
            None,
        )
        .await?;
    if theater.is_none() {
        return Err(ApiError::NotFound("theater not found".to_string()));
    }

    let rooms = database.collection::<Room>("rooms");
    let mut room = Room {
        id: None,
        theater_id: Some(theater_id),
        name: payload.name,
        status: Status::Active,
    };
    let insert_result = rooms.insert_one(&room, None).await?;
    room.id = insert_result.inserted_id.as_object_id();
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn update_room(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<RoomUpdate>,
) -> Result<Json<RoomUpdate>, ApiError> {
    let room_id = parse_object_id(&id_str)?;
    let rooms = db(&client).collection::<Room>("rooms");

    let set_doc = to_set_document(&payload);
    if set_doc.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }

    let update_result = rooms
        .update_one(doc! { "_id": room_id }, doc! { "$set": set_doc }, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("room not found".to_string()));
    }
    Ok(Json(payload))
}

/// Soft delete, refused while the room still has active seats.
pub async fn delete_room(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Value>, ApiError> {
    let room_id = parse_object_id(&id_str)?;
    let database = db(&client);
    let rooms = database.collection::<Room>("rooms");
    let seats = database.collection::<Document>("seats");

    let active_seats = seats
        .count_documents(active_seats_query(&room_id), None)
        .await?;
    if active_seats > 0 {
        return Err(ApiError::BadRequest(
            "room still has active seats".to_string(),
        ));
    }

    let update_result = rooms
        .update_one(
            doc! { "_id": room_id },
            doc! { "$set": { "status": Status::Inactive.as_str() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("room not found".to_string()));
    }
    Ok(Json(json!({ "message": "room deactivated" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_guard_counts_only_active_seats_of_the_room() {
        let room_id = ObjectId::new();
        let query = active_seats_query(&room_id);

        assert_eq!(query.get_object_id("room_id").unwrap(), room_id);
        assert_eq!(query.get_str("status").unwrap(), "active");
        assert_eq!(query.len(), 2);
    }
}
