use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::combo_model::{Combo, ComboUpdate, CreateComboRequest};
use crate::models::Status;
use crate::pagination::{find_page, ListRequest, ListResponse};
use crate::utils::{db, parse_object_id, to_set_document};

pub async fn load_combos(
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Vec<Combo>>, ApiError> {
    let combos = db(&client).collection::<Combo>("combos");
    let mut cursor = combos
        .find(doc! { "status": Status::Active.as_str() }, None)
        .await?;
    let mut result = Vec::new();
    while let Some(combo) = cursor.try_next().await? {
        result.push(combo);
    }
    Ok(Json(result))
}

pub async fn list_combos(
    Extension(client): Extension<Arc<Client>>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ListResponse<Combo>>, ApiError> {
    let combos = db(&client).collection::<Combo>("combos");
    Ok(Json(find_page(&combos, &request).await?))
}

pub async fn add_combo(
    Extension(client): Extension<Arc<Client>>,
    Json(payload): Json<CreateComboRequest>,
) -> Result<(StatusCode, Json<Combo>), ApiError> {
    if payload.price < 0.0 {
        return Err(ApiError::BadRequest("price cannot be negative".to_string()));
    }

    let combos = db(&client).collection::<Combo>("combos");
    let mut combo = Combo {
        id: None,
        name: payload.name,
        description: payload.description,
        price: payload.price,
        status: Status::Active,
    };
    let insert_result = combos.insert_one(&combo, None).await?;
    combo.id = insert_result.inserted_id.as_object_id();
    Ok((StatusCode::CREATED, Json(combo)))
}

pub async fn update_combo(
    Extension(client): Extension<Arc<Client>>,
    Path(id_str): Path<String>,
    Json(payload): Json<ComboUpdate>,
) -> Result<Json<ComboUpdate>, ApiError> {
    let combo_id = parse_object_id(&id_str)?;
    let combos = db(&client).collection::<Combo>("combos");

    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(ApiError::BadRequest("price cannot be negative".to_string()));
        }
    }

    let set_doc = to_set_document(&payload);
    if set_doc.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }

    let update_result = combos
        .update_one(doc! { "_id": combo_id }, doc! { "$set": set_doc }, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("combo not found".to_string()));
    }
    Ok(Json(payload))
}

pub async fn delete_combo(
    Path(id_str): Path<String>,
    Extension(client): Extension<Arc<Client>>,
) -> Result<Json<Value>, ApiError> {
    let combo_id = parse_object_id(&id_str)?;
    let combos = db(&client).collection::<Combo>("combos");

    let update_result = combos
        .update_one(
            doc! { "_id": combo_id },
            doc! { "$set": { "status": Status::Inactive.as_str() } },
            None,
        )
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::NotFound("combo not found".to_string()));
    }
    Ok(Json(json!({ "message": "combo deactivated" })))
}
