use chrono::{DateTime as ChronoDateTime, Utc};
use mongodb::bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

use super::movie_model::Movie;
use super::room_model::Room;
use super::Status;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Showtime {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub movie_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub room_id: Option<ObjectId>,
    pub start_time: DateTime,
    pub end_time: DateTime,
    pub price: f64,
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShowtimeResponse {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub movie_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub room_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub start_time: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub end_time: DateTime,
    pub price: f64,
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShowtimeDetail {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub movie_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub room_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub start_time: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub end_time: DateTime,
    pub price: f64,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<Movie>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
}

#[derive(Debug, Deserialize)]
pub struct CreateShowtimeRequest {
    pub movie_id: String,
    pub room_id: String,
    pub start_time: ChronoDateTime<Utc>,
    pub end_time: ChronoDateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct ShowtimeUpdate {
    pub movie_id: Option<ObjectId>,
    pub room_id: Option<ObjectId>,
    pub start_time: Option<ChronoDateTime<Utc>>,
    pub end_time: Option<ChronoDateTime<Utc>>,
    pub price: Option<f64>,
}
