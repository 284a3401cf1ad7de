use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

use super::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Standard,
    Vip,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Seat {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub room_id: Option<ObjectId>,
    pub row: String,
    pub number: i32,
    pub seat_type: SeatType,
    pub status: Status,
}

#[derive(Debug, Deserialize)]
pub struct CreateSeatRequest {
    pub room_id: String,
    pub row: String,
    pub number: i32,
    #[serde(default = "default_seat_type")]
    pub seat_type: SeatType,
}

fn default_seat_type() -> SeatType {
    SeatType::Standard
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeatUpdate {
    pub row: Option<String>,
    pub number: Option<i32>,
    pub seat_type: Option<SeatType>,
}

/// Seat map entry for a given showtime: the seat itself plus whether it
/// is still free.
#[derive(Debug, Serialize)]
pub struct SeatAvailability {
    #[serde(flatten)]
    pub seat: Seat,
    pub available: bool,
}
