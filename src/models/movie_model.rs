use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

use super::showtime_model::ShowtimeResponse;
use super::Status;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Movie {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub title: String,
    pub genres: Vec<String>,
    pub duration: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub title: String,
    pub genres: Vec<String>,
    pub duration: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub status: Status,
    pub showtimes: Vec<ShowtimeResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub duration: i32,
    pub description: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub genres: Option<Vec<String>>,
    pub duration: Option<i32>,
    pub description: Option<String>,
    pub poster: Option<String>,
}
