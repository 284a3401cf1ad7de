use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::seat_model::{CreateSeatRequest, Seat, SeatUpdate};
use crate::models::Status;
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id, to_set_document};

/// Filter matching another active seat at the same (row, number) of a
/// room. Seat positions must stay unique within their room.
fn duplicate_seat_query(
    room_id: &ObjectId,
    row: &str,
    number: i32,
    exclude_seat_id: Option<ObjectId>,
) -> Document {
    let mut query = doc! {
        "room_id": room_id,
        "row": row,
        "number": number,
        "status": Status::Active.as_str(),
    };
    if let Some(exclude_id) = exclude_seat_id {
        query.insert("_id", doc! { "$ne": exclude_id });
    }
    query
}

pub async fn list_seats(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<Seat>>, ApiError> {
    let seats = db(&client).collection::<Seat>("seats");
    Ok(Json(find_page(&seats, &request).await?))
}

pub async fn add_seat(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<CreateSeatRequest>,
) -> Result<(StatusCode, Json<Seat>), ApiError> {
    let room_id = parse_object_id(&payload.room_id)?;
    let database = db(&client);

    let rooms = database.collection::<Document>("rooms");
    let room = rooms
        .find_one(
            doc! { "_id": room_id, "status": Status::Active.as_str() },
            None,
        )
        .await?;
    if room.is_none() {
        return Err(ApiError::NotFound("room not found".to_string()));
    }

    let seats = database.collection::<Seat>("seats");
    let duplicates = seats
        .count_documents(
            duplicate_seat_query(&room_id, &payload.row, payload.number, None),
            None,
        )
        .await?;
    if duplicates > 0 {
        return Err(ApiError::BadRequest(format!(
            "seat {}{} already exists in this room",
            payload.row, payload.number
        )));
    }

    let mut seat = Seat {
        id: None,
        room_id: Some(room_id),
        row: payload.row,
        number: payload.number,
        seat_type: payload.seat_type,
        status: Status::Active,
    };
    let insert_result = seats.insert_one(&seat, None).await?;
    seat.id = insert_result.inserted_id.as_object_id();
    Ok((StatusCode::CREATED, Json(seat)))
}

pub async fn update_seat(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<SeatUpdate>,
) -> Result<Json<SeatUpdate>, ApiError> {
    let seat_id = parse_object_id(&id_str)?;
    let seats = db(&client).collection::<Seat>("seats");

    let current = seats
        .find_one(doc! { "_id": seat_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("seat not found".to_string()))?;

    if payload.row.is_some() || payload.number.is_some() {
        let room_id = current
            .room_id
            .ok_or_else(|| ApiError::Internal("seat without room".to_string()))?;
        let row = payload.row.clone().unwrap_or(current.row);
        let number = payload.number.unwrap_or(current.number);
        let duplicates = seats
            .count_documents(
                duplicate_seat_query(&room_id, &row, number, Some(seat_id)),
                None,
            )
            .await?;
        if duplicates > 0 {
            return Err(ApiError::BadRequest(format!(
                "seat {}{} already exists in this room",
                row, number
            )));
        }
    }

    let set_doc = to_set_document(&payload);
    if set_doc.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }
    seats
        .update_one(doc! { "_id": seat_id }, doc! { "$set": set_doc }, None)
        .await?;
    Ok(Json(payload))
}

pub async fn delete_seat(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Value>, ApiError> {
    let seat_id = parse_object_id(&id_str)?;
    let seats = db(&client).collection::<Seat>("seats");

    let update_result = seats
        .update_one(
            doc! { "_id": seat_id },
            doc! { "$set": { "status": Status::Inactive.as_str() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("seat not found".to_string()));
    }
    Ok(Json(json!({ "message": "seat deactivated" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_query_targets_active_seats_in_the_room() {
        let room_id = ObjectId::new();
        let query = duplicate_seat_query(&room_id, "B", 7, None);
        assert_eq!(query.get_object_id("room_id").unwrap(), room_id);
        assert_eq!(query.get_str("row").unwrap(), "B");
        assert_eq!(query.get_i32("number").unwrap(), 7);
        assert_eq!(query.get_str("status").unwrap(), "active");
        assert!(!query.contains_key("_id"));
    }

    #[test]
    fn duplicate_query_excludes_the_seat_being_updated() {
        let seat_id = ObjectId::new();
        let query = duplicate_seat_query(&ObjectId::new(), "A", 1, Some(seat_id));
        let exclusion = query.get_document("_id").unwrap();
        assert_eq!(exclusion.get_object_id("$ne").unwrap(), seat_id);
    }
}
