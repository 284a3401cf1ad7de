use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::{serialize_datetime, serialize_object_id};

use super::Status;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Review {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub movie_id: Option<ObjectId>,
    #[serde(serialize_with = "serialize_object_id")]
    pub user_id: Option<ObjectId>,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub status: Status,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub movie_id: String,
    pub rating: i32,
    pub comment: Option<String>,
}
