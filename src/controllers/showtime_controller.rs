use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, from_document, oid::ObjectId, DateTime, Document};
use mongodb::Client;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::booking_model::BookingSeat;
use crate::models::seat_model::{Seat, SeatAvailability};
use crate::models::showtime_model::{
    CreateShowtimeRequest, Showtime, ShowtimeDetail, ShowtimeResponse, ShowtimeUpdate,
};
use crate::models::{Status, StatusPatch};
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id};

/// Filter matching any other active showtime in the room whose
/// [start, end) range intersects the candidate's.
fn conflict_query(
    room_id: &ObjectId,
    start: DateTime,
    end: DateTime,
    exclude_showtime_id: Option<ObjectId>,
) -> Document {
    let mut query = doc! {
        "room_id": room_id,
        "status": Status::Active.as_str(),
        "$and": [
            { "start_time": { "$lt": end } },
            { "end_time": { "$gt": start } },
        ],
    };
    if let Some(exclude_id) = exclude_showtime_id {
        query.insert("_id", doc! { "$ne": exclude_id });
    }
    query
}

async fn is_room_available(
    client: &Arc<Client>,
    room_id: &ObjectId,
    start: DateTime,
    end: DateTime,
    exclude_showtime_id: Option<ObjectId>,
) -> Result<bool, ApiError> {
    let showtimes = db(client).collection::<Showtime>("showtimes");
    let count = showtimes
        .count_documents(conflict_query(room_id, start, end, exclude_showtime_id), None)
        .await?;
    Ok(count == 0)
}

fn detail_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$lookup": {
                "from": "movies",
                "localField": "movie_id",
                "foreignField": "_id",
                "as": "movie",
            },
        },
        doc! {
            "$lookup": {
                "from": "rooms",
                "localField": "room_id",
                "foreignField": "_id",
                "as": "room"
            }
        },
        doc! {
            "$unwind": {
                "path": "$movie",
                "preserveNullAndEmptyArrays": true
            }
        },
        doc! {
            "$unwind": {
                "path": "$room",
                "preserveNullAndEmptyArrays": true
            }
        },
        doc! {
            "$project": {
                "movie.description": 0,
                "movie.poster": 0,
            }
        },
    ]
}

/// Public schedule: active showtimes joined with their movie and room.
pub async fn load_showtimes_with_details(
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Vec<ShowtimeDetail>>, ApiError> {
    let showtimes = db(&client).collection::<Showtime>("showtimes");

    let mut pipeline = vec![doc! { "$match": { "status": Status::Active.as_str() } }];
    pipeline.extend(detail_pipeline());
    pipeline.push(doc! { "$sort": { "start_time": 1 } });

    let mut cursor = showtimes.aggregate(pipeline, None).await?;
    let mut result = Vec::new();
    while let Some(document) = cursor.try_next().await? {
        result.push(from_document::<ShowtimeDetail>(document)?);
    }
    Ok(Json(result))
}

pub async fn fetch_showtime_by_id(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<ShowtimeDetail>, ApiError> {
    let showtime_id = parse_object_id(&id_str)?;
    let showtimes = db(&client).collection::<Showtime>("showtimes");

    let mut pipeline = vec![doc! { "$match": { "_id": showtime_id } }];
    pipeline.extend(detail_pipeline());

    let mut cursor = showtimes.aggregate(pipeline, None).await?;
    match cursor.try_next().await? {
        Some(document) => Ok(Json(from_document::<ShowtimeDetail>(document)?)),
        None => Err(ApiError::NotFound("showtime not found".to_string())),
    }
}

/// Seat map for a showtime: every active seat of its room, flagged with
/// whether a live booking already holds it.
pub async fn load_showtime_seats(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Vec<SeatAvailability>>, ApiError> {
    let showtime_id = parse_object_id(&id_str)?;
    let database = db(&client);

    let showtimes = database.collection::<Showtime>("showtimes");
    let showtime = showtimes
        .find_one(doc! { "_id": showtime_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("showtime not found".to_string()))?;

    let seats = database.collection::<Seat>("seats");
    let mut cursor = seats
        .find(
            doc! { "room_id": showtime.room_id, "status": Status::Active.as_str() },
            None,
        )
        .await?;

    let booking_seats = database.collection::<BookingSeat>("booking_seats");
    let mut taken: HashSet<ObjectId> = HashSet::new();
    let mut booked_cursor = booking_seats
        .find(
            doc! { "showtime_id": showtime_id, "status": "active" },
            None,
        )
        .await?;
    while let Some(booking_seat) = booked_cursor.try_next().await? {
        if let Some(seat_id) = booking_seat.seat_id {
            taken.insert(seat_id);
        }
    }

    let mut result = Vec::new();
    while let Some(seat) = cursor.try_next().await? {
        let available = seat.id.map(|id| !taken.contains(&id)).unwrap_or(false);
        result.push(SeatAvailability { seat, available });
    }
    Ok(Json(result))
}

pub async fn list_showtimes(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<ShowtimeResponse>>, ApiError> {
    let showtimes = db(&client).collection::<ShowtimeResponse>("showtimes");
    Ok(Json(find_page(&showtimes, &request).await?))
}

pub async fn add_showtime(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<CreateShowtimeRequest>,
) -> Result<(StatusCode, Json<ShowtimeResponse>), ApiError> {
    if payload.end_time <= payload.start_time {
        return Err(ApiError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    let movie_id = parse_object_id(&payload.movie_id)?;
    let room_id = parse_object_id(&payload.room_id)?;
    let database = db(&client);

    let movies = database.collection::<Document>("movies");
    if movies
        .find_one(doc! { "_id": movie_id, "status": Status::Active.as_str() }, None)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("movie not found".to_string()));
    }

    let rooms = database.collection::<Document>("rooms");
    if rooms
        .find_one(doc! { "_id": room_id, "status": Status::Active.as_str() }, None)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("room not found".to_string()));
    }

    let start = bson::DateTime::from_chrono(payload.start_time);
    let end = bson::DateTime::from_chrono(payload.end_time);
    if !is_room_available(&client, &room_id, start, end, None).await? {
        return Err(ApiError::Conflict(
            "room already has an active showtime in that time range".to_string(),
        ));
    }

    let showtimes = database.collection::<Showtime>("showtimes");
    let showtime = Showtime {
        id: None,
        movie_id: Some(movie_id),
        room_id: Some(room_id),
        start_time: start,
        end_time: end,
        price: payload.price,
        status: Status::Active,
    };
    let insert_result = showtimes.insert_one(&showtime, None).await?;

    let created = ShowtimeResponse {
        id: insert_result.inserted_id.as_object_id(),
        movie_id: showtime.movie_id,
        room_id: showtime.room_id,
        start_time: showtime.start_time,
        end_time: showtime.end_time,
        price: showtime.price,
        status: showtime.status,
    };
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_showtime(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<ShowtimeUpdate>,
) -> Result<Json<ShowtimeResponse>, ApiError> {
    let showtime_id = parse_object_id(&id_str)?;
    let showtimes = db(&client).collection::<Showtime>("showtimes");

    let current = showtimes
        .find_one(doc! { "_id": showtime_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("showtime not found".to_string()))?;

    // Effective schedule after the patch is applied.
    let room_id = payload
        .room_id
        .or(current.room_id)
        .ok_or_else(|| ApiError::BadRequest("showtime has no room".to_string()))?;
    let start = payload
        .start_time
        .map(bson::DateTime::from_chrono)
        .unwrap_or(current.start_time);
    let end = payload
        .end_time
        .map(bson::DateTime::from_chrono)
        .unwrap_or(current.end_time);

    if end <= start {
        return Err(ApiError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    if current.status == Status::Active
        && !is_room_available(&client, &room_id, start, end, Some(showtime_id)).await?
    {
        return Err(ApiError::Conflict(
            "room already has an active showtime in that time range".to_string(),
        ));
    }

    let mut set_doc = doc! {
        "room_id": room_id,
        "start_time": start,
        "end_time": end,
    };
    if let Some(movie_id) = payload.movie_id {
        set_doc.insert("movie_id", movie_id);
    }
    if let Some(price) = payload.price {
        set_doc.insert("price", price);
    }

    showtimes
        .update_one(doc! { "_id": showtime_id }, doc! { "$set": set_doc }, None)
        .await?;

    let updated = showtimes
        .find_one(doc! { "_id": showtime_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("showtime not found after update".to_string()))?;

    Ok(Json(ShowtimeResponse {
        id: updated.id,
        movie_id: updated.movie_id,
        room_id: updated.room_id,
        start_time: updated.start_time,
        end_time: updated.end_time,
        price: updated.price,
        status: updated.status,
    }))
}

/// Status toggle; reactivating a showtime re-runs the overlap check so a
/// soft-deleted slot cannot slide back into a now-occupied range.
pub async fn patch_showtime_status(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<StatusPatch>,
) -> Result<Json<Value>, ApiError> {
    let showtime_id = parse_object_id(&id_str)?;
    let showtimes = db(&client).collection::<Showtime>("showtimes");

    let current = showtimes
        .find_one(doc! { "_id": showtime_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("showtime not found".to_string()))?;

    if payload.status == Status::Active {
        let room_id = current
            .room_id
            .ok_or_else(|| ApiError::BadRequest("showtime has no room".to_string()))?;
        if !is_room_available(
            &client,
            &room_id,
            current.start_time,
            current.end_time,
            Some(showtime_id),
        )
        .await?
        {
            return Err(ApiError::Conflict(
                "room already has an active showtime in that time range".to_string(),
            ));
        }
    }

    showtimes
        .update_one(
            doc! { "_id": showtime_id },
            doc! { "$set": { "status": payload.status.as_str() } },
            None,
        )
        .await?;
    Ok(Json(json!({ "message": "showtime status updated" })))
}

pub async fn delete_showtime(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Value>, ApiError> {
    let showtime_id = parse_object_id(&id_str)?;
    let database = db(&client);
    let showtimes = database.collection::<Showtime>("showtimes");

    let active_bookings = database
        .collection::<Document>("booking_seats")
        .count_documents(
            doc! { "showtime_id": showtime_id, "status": "active" },
            None,
        )
        .await?;
    if active_bookings > 0 {
        return Err(ApiError::BadRequest(
            "showtime still has active bookings".to_string(),
        ));
    }

    let update_result = showtimes
        .update_one(
            doc! { "_id": showtime_id },
            doc! { "$set": { "status": Status::Inactive.as_str() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("showtime not found".to_string()));
    }
    Ok(Json(json!({ "message": "showtime deactivated" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32) -> DateTime {
        DateTime::from_chrono(Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap())
    }

    #[test]
    fn conflict_query_uses_half_open_interval_bounds() {
        let room_id = ObjectId::new();
        let query = conflict_query(&room_id, at(18), at(20), None);

        assert_eq!(query.get_object_id("room_id").unwrap(), room_id);
        assert_eq!(query.get_str("status").unwrap(), "active");

        let clauses = query.get_array("$and").unwrap();
        let starts_before_end = clauses[0].as_document().unwrap();
        let ends_after_start = clauses[1].as_document().unwrap();
        assert_eq!(
            starts_before_end
                .get_document("start_time")
                .unwrap()
                .get_datetime("$lt")
                .unwrap(),
            &at(20)
        );
        assert_eq!(
            ends_after_start
                .get_document("end_time")
                .unwrap()
                .get_datetime("$gt")
                .unwrap(),
            &at(18)
        );
    }

    #[test]
    fn conflict_query_excludes_the_record_being_updated() {
        let showtime_id = ObjectId::new();
        let query = conflict_query(&ObjectId::new(), at(18), at(20), Some(showtime_id));
        let exclusion = query.get_document("_id").unwrap();
        assert_eq!(exclusion.get_object_id("$ne").unwrap(), showtime_id);
    }

    #[test]
    fn conflict_query_ignores_inactive_showtimes() {
        // The status clause is what lets a cancelled slot be reused.
        let query = conflict_query(&ObjectId::new(), at(10), at(12), None);
        assert_eq!(query.get_str("status").unwrap(), "active");
    }
}
