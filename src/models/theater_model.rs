use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

use super::room_model::Room;
use super::Status;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Theater {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub name: String,
    pub address: String,
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TheaterDetail {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub name: String,
    pub address: String,
    pub status: Status,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTheaterRequest {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TheaterUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
}
