use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, from_document, oid::ObjectId, DateTime, Document};
use mongodb::options::FindOptions;
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;
use crate::models::booking_model::{
    Booking, BookingDetail, BookingSeat, BookingStatus, ComboLine, CreateBookingRequest,
    PaymentStatus,
};
use crate::models::combo_model::Combo;
use crate::models::seat_model::Seat;
use crate::models::showtime_model::Showtime;
use crate::models::Status;
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id};

/// Filter matching live reservations that already hold any of the
/// requested seats for this showtime.
fn seat_conflict_query(showtime_id: &ObjectId, seat_ids: &[ObjectId]) -> Document {
    doc! {
        "showtime_id": showtime_id,
        "seat_id": { "$in": seat_ids.to_vec() },
        "status": "active",
    }
}

fn booking_total(seat_count: usize, seat_price: f64, combos: &[ComboLine]) -> f64 {
    let combo_total: f64 = combos
        .iter()
        .map(|line| line.unit_price * line.quantity as f64)
        .sum();
    seat_count as f64 * seat_price + combo_total
}

pub async fn create_booking(
    Extension(client): Extension<Arc<Client>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingDetail>), ApiError> {
    if payload.seat_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "at least one seat is required".to_string(),
        ));
    }

    // Customers always book for themselves; staff may book for a known
    // customer or leave the booking anonymous for a walk-in sale.
    let customer_id = match &payload.customer_id {
        Some(id_str) => {
            let requested = parse_object_id(id_str)?;
            if !auth.role.is_staff() && requested != auth.id {
                return Err(ApiError::Forbidden(
                    "cannot book on behalf of another customer".to_string(),
                ));
            }
            Some(requested)
        }
        None => {
            if auth.role.is_staff() {
                None
            } else {
                Some(auth.id)
            }
        }
    };

    let showtime_id = parse_object_id(&payload.showtime_id)?;
    let database = db(&client);

    let showtimes = database.collection::<Showtime>("showtimes");
    let showtime = showtimes
        .find_one(doc! { "_id": showtime_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("showtime not found".to_string()))?;
    if showtime.status != Status::Active {
        return Err(ApiError::BadRequest(
            "showtime is not open for booking".to_string(),
        ));
    }

    let mut seat_ids = Vec::with_capacity(payload.seat_ids.len());
    for id_str in &payload.seat_ids {
        seat_ids.push(parse_object_id(id_str)?);
    }

    let seats = database.collection::<Seat>("seats");
    let matching_seats = seats
        .count_documents(
            doc! {
                "_id": { "$in": seat_ids.clone() },
                "room_id": showtime.room_id,
                "status": Status::Active.as_str(),
            },
            None,
        )
        .await?;
    if matching_seats as usize != seat_ids.len() {
        return Err(ApiError::BadRequest(
            "one or more seats do not belong to this showtime's room".to_string(),
        ));
    }

    let booking_seats = database.collection::<BookingSeat>("booking_seats");
    let already_taken = booking_seats
        .count_documents(seat_conflict_query(&showtime_id, &seat_ids), None)
        .await?;
    if already_taken > 0 {
        return Err(ApiError::Conflict(
            "one or more seats are already booked for this showtime".to_string(),
        ));
    }

    let combos_collection = database.collection::<Combo>("combos");
    let mut combo_lines = Vec::with_capacity(payload.combos.len());
    for line in &payload.combos {
        if line.quantity <= 0 {
            return Err(ApiError::BadRequest(
                "combo quantity must be positive".to_string(),
            ));
        }
        let combo_id = parse_object_id(&line.combo_id)?;
        let combo = combos_collection
            .find_one(
                doc! { "_id": combo_id, "status": Status::Active.as_str() },
                None,
            )
            .await?
            .ok_or_else(|| ApiError::BadRequest("unknown combo".to_string()))?;
        combo_lines.push(ComboLine {
            combo_id: combo.id,
            name: combo.name,
            quantity: line.quantity,
            unit_price: combo.price,
        });
    }

    let now = DateTime::now();
    let total = booking_total(seat_ids.len(), showtime.price, &combo_lines);
    let booking = Booking {
        id: None,
        customer_id,
        showtime_id: Some(showtime_id),
        combos: combo_lines,
        total,
        payment_method: None,
        payment_status: PaymentStatus::Pending,
        status: BookingStatus::Active,
        created_by: Some(auth.id),
        created_at: now,
        updated_at: now,
    };

    let bookings = database.collection::<Booking>("bookings");
    let insert_result = bookings.insert_one(&booking, None).await?;
    let booking_id = insert_result.inserted_id.as_object_id();

    let seat_docs: Vec<BookingSeat> = seat_ids
        .iter()
        .map(|seat_id| BookingSeat {
            id: None,
            booking_id,
            showtime_id: Some(showtime_id),
            seat_id: Some(*seat_id),
            price: showtime.price,
            status: BookingStatus::Active,
        })
        .collect();
    booking_seats.insert_many(&seat_docs, None).await?;

    tracing::info!(
        booking = ?booking_id.map(|id| id.to_hex()),
        seats = seat_ids.len(),
        "booking created"
    );

    Ok((
        StatusCode::CREATED,
        Json(BookingDetail {
            id: booking_id,
            customer_id: booking.customer_id,
            showtime_id: booking.showtime_id,
            combos: booking.combos,
            total: booking.total,
            payment_method: booking.payment_method,
            payment_status: booking.payment_status,
            status: booking.status,
            created_by: booking.created_by,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
            seats: seat_docs,
        }),
    ))
}

pub async fn fetch_booking_by_id(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<BookingDetail>, ApiError> {
    let booking_id = parse_object_id(&id_str)?;
    let bookings = db(&client).collection::<Booking>("bookings");

    let pipeline = vec![
        doc! { "$match": { "_id": booking_id } },
        doc! {
            "$lookup": {
                "from": "booking_seats",
                "localField": "_id",
                "foreignField": "booking_id",
                "as": "seats"
            }
        },
    ];

    let mut cursor = bookings.aggregate(pipeline, None).await?;
    let detail = match cursor.try_next().await? {
        Some(document) => from_document::<BookingDetail>(document)?,
        None => return Err(ApiError::NotFound("booking not found".to_string())),
    };

    if !auth.role.is_staff() && detail.customer_id != Some(auth.id) {
        return Err(ApiError::Forbidden(
            "booking belongs to another customer".to_string(),
        ));
    }
    Ok(Json(detail))
}

pub async fn load_my_bookings(
    Extension(client): Extension<Arc<Client>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let bookings = db(&client).collection::<Booking>("bookings");
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();
    let mut cursor = bookings
        .find(doc! { "customer_id": auth.id }, options)
        .await?;
    let mut result = Vec::new();
    while let Some(booking) = cursor.try_next().await? {
        result.push(booking);
    }
    Ok(Json(result))
}

pub async fn list_bookings(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<Booking>>, ApiError> {
    let bookings = db(&client).collection::<Booking>("bookings");
    Ok(Json(find_page(&bookings, &request).await?))
}

/// Cancels a booking and releases its seats. Paid bookings flip to
/// refunded so the money trail stays visible.
pub async fn cancel_booking(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let booking_id = parse_object_id(&id_str)?;
    let database = db(&client);
    let bookings = database.collection::<Booking>("bookings");

    let booking = bookings
        .find_one(doc! { "_id": booking_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("booking not found".to_string()))?;

    if !auth.role.is_staff() && booking.customer_id != Some(auth.id) {
        return Err(ApiError::Forbidden(
            "booking belongs to another customer".to_string(),
        ));
    }
    if booking.status == BookingStatus::Cancelled {
        return Err(ApiError::BadRequest(
            "booking is already cancelled".to_string(),
        ));
    }

    let payment_status = match booking.payment_status {
        PaymentStatus::Paid => PaymentStatus::Refunded,
        other => other,
    };

    bookings
        .update_one(
            doc! { "_id": booking_id },
            doc! { "$set": {
                "status": "cancelled",
                "payment_status": mongodb::bson::to_bson(&payment_status)
                    .map_err(|e| ApiError::Internal(e.to_string()))?,
                "updated_at": DateTime::now(),
            }},
            None,
        )
        .await?;

    database
        .collection::<Document>("booking_seats")
        .update_many(
            doc! { "booking_id": booking_id },
            doc! { "$set": { "status": "cancelled" } },
            None,
        )
        .await?;

    Ok(Json(json!({ "message": "booking cancelled" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_conflict_query_targets_live_reservations() {
        let showtime_id = ObjectId::new();
        let seat_a = ObjectId::new();
        let seat_b = ObjectId::new();
        let query = seat_conflict_query(&showtime_id, &[seat_a, seat_b]);

        assert_eq!(query.get_object_id("showtime_id").unwrap(), showtime_id);
        assert_eq!(query.get_str("status").unwrap(), "active");
        let in_clause = query
            .get_document("seat_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(in_clause.len(), 2);
    }

    #[test]
    fn total_sums_seats_and_combo_lines() {
        let combos = vec![
            ComboLine {
                combo_id: Some(ObjectId::new()),
                name: "Popcorn + soda".into(),
                quantity: 2,
                unit_price: 8.5,
            },
            ComboLine {
                combo_id: Some(ObjectId::new()),
                name: "Nachos".into(),
                quantity: 1,
                unit_price: 6.0,
            },
        ];
        // 3 seats at 12.0 plus 2 * 8.5 + 6.0 of snacks.
        assert!((booking_total(3, 12.0, &combos) - 59.0).abs() < f64::EPSILON);
        assert!((booking_total(2, 10.0, &[]) - 20.0).abs() < f64::EPSILON);
    }
}
