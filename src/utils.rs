use mongodb::bson::{oid::ObjectId, Bson, DateTime, Document};
use mongodb::{Client, Database};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::ApiError;

pub const DB_NAME: &str = "cinema-booking";

pub fn db(client: &Client) -> Database {
    client.database(DB_NAME)
}

/// Renders ids as hex strings in JSON while keeping them native
/// ObjectIds in BSON, so the same struct can serve as both the stored
/// document and the response body.
pub fn serialize_object_id<S>(id: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(id) if serializer.is_human_readable() => serializer.serialize_str(&id.to_hex()),
        Some(id) => id.serialize(serializer),
        None => serializer.serialize_none(),
    }
}

/// RFC 3339 in JSON, native datetime in BSON. Counterpart of
/// [`serialize_object_id`] for timestamp fields on stored documents.
pub fn serialize_datetime<S>(datetime: &DateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if serializer.is_human_readable() {
        let formatted = datetime
            .try_to_rfc3339_string()
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    } else {
        datetime.serialize(serializer)
    }
}

pub fn parse_object_id(id_str: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id_str)
        .map_err(|_| ApiError::BadRequest(format!("invalid id: {}", id_str)))
}

/// Builds a `$set` document from an all-optional update payload,
/// keeping only the fields that were actually provided.
pub fn to_set_document<T: Serialize>(update: &T) -> Document {
    let json = serde_json::to_value(update).unwrap_or_else(|_| Value::Object(Default::default()));

    let mut set_doc = Document::new();
    if let Value::Object(obj) = json {
        for (key, value) in obj {
            if !value.is_null() {
                let bson_value = match Bson::try_from(value) {
                    Ok(bv) => bv,
                    Err(_) => continue,
                };
                set_doc.insert(key, bson_value);
            }
        }
    }
    set_doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Patch {
        name: Option<String>,
        price: Option<f64>,
    }

    #[test]
    fn set_document_skips_absent_fields() {
        let patch = Patch {
            name: Some("Large popcorn".into()),
            price: None,
        };
        let doc = to_set_document(&patch);
        assert_eq!(doc.get_str("name").unwrap(), "Large popcorn");
        assert!(!doc.contains_key("price"));
    }

    #[derive(Serialize)]
    struct Tagged {
        #[serde(serialize_with = "serialize_object_id")]
        owner: Option<ObjectId>,
    }

    #[test]
    fn object_id_is_hex_in_json_and_native_in_bson() {
        let id = ObjectId::new();
        let tagged = Tagged { owner: Some(id) };

        let json = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["owner"], Value::String(id.to_hex()));

        // The driver stores documents through the raw (non-human-readable)
        // serializer, which is the path that must keep ids native.
        let raw = mongodb::bson::to_raw_document_buf(&tagged).unwrap();
        assert_eq!(raw.get_object_id("owner").unwrap(), id);
    }

    #[test]
    fn parse_object_id_rejects_garbage() {
        assert!(parse_object_id("not-an-id").is_err());
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
    }
}
