use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

use super::seat_model::Seat;
use super::Status;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Room {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub theater_id: Option<ObjectId>,
    pub name: String,
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomDetail {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub theater_id: Option<ObjectId>,
    pub name: String,
    pub status: Status,
    pub seats: Vec<Seat>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub theater_id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub name: Option<String>,
}
