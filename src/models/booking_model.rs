use mongodb::bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::{serialize_datetime, serialize_object_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

/// Snack/drink line item embedded in a booking, with the unit price
/// captured at booking time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComboLine {
    #[serde(serialize_with = "serialize_object_id")]
    pub combo_id: Option<ObjectId>,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub customer_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub showtime_id: Option<ObjectId>,
    pub combos: Vec<ComboLine>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    #[serde(serialize_with = "serialize_object_id")]
    pub created_by: Option<ObjectId>,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime,
}

/// One reserved seat of a booking. The seat-conflict check runs against
/// this collection, keyed by (showtime_id, seat_id, status).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingSeat {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub booking_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub showtime_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub seat_id: Option<ObjectId>,
    pub price: f64,
    pub status: BookingStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingDetail {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub customer_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub showtime_id: Option<ObjectId>,
    pub combos: Vec<ComboLine>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    #[serde(serialize_with = "serialize_object_id")]
    pub created_by: Option<ObjectId>,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub updated_at: DateTime,
    pub seats: Vec<BookingSeat>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub showtime_id: String,
    pub seat_ids: Vec<String>,
    #[serde(default)]
    pub combos: Vec<ComboLineRequest>,
    /// Staff POS only: book on behalf of a customer, or leave empty for
    /// a walk-in sale.
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ComboLineRequest {
    pub combo_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub booking_id: String,
    pub method: PaymentMethod,
}
