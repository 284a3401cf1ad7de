use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

use super::Status;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Combo {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub status: Status,
}

#[derive(Debug, Deserialize)]
pub struct CreateComboRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComboUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}
