use axum::{extract::Extension, response::Json};
use mongodb::bson::{doc, DateTime};
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::booking_model::{Booking, BookingStatus, PaymentRequest, PaymentStatus};
use crate::utils::{db, parse_object_id};

/// Point-of-sale payment capture: marks a pending booking as paid.
pub async fn take_payment(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<Value>, ApiError> {
    let booking_id = parse_object_id(&payload.booking_id)?;
    let bookings = db(&client).collection::<Booking>("bookings");

    let booking = bookings
        .find_one(doc! { "_id": booking_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("booking not found".to_string()))?;

    if booking.status == BookingStatus::Cancelled {
        return Err(ApiError::BadRequest(
            "cannot pay for a cancelled booking".to_string(),
        ));
    }
    if booking.payment_status == PaymentStatus::Paid {
        return Err(ApiError::Conflict("booking is already paid".to_string()));
    }

    bookings
        .update_one(
            doc! { "_id": booking_id },
            doc! { "$set": {
                "payment_status": "paid",
                "payment_method": mongodb::bson::to_bson(&payload.method)
                    .map_err(|e| ApiError::Internal(e.to_string()))?,
                "updated_at": DateTime::now(),
            }},
            None,
        )
        .await?;

    tracing::info!(booking = %booking_id.to_hex(), "payment captured");
    Ok(Json(json!({ "message": "payment recorded" })))
}
