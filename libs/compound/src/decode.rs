//! Reference-aware decoding of a raw reference into an entity type.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::reference::RawReference;

/// Decodes a raw reference into `T`.
///
/// The `{id, type}` envelope is laid down first and the payload's fields
/// are merged over it, so an entity type can declare `id` and `type`
/// alongside its domain fields without the payload repeating them.
/// Payload keys win on collision.
///
/// Entity types should be `#[serde(default)]`: fields that neither the
/// envelope nor the payload mention keep their default value.
pub fn decode_reference<T: DeserializeOwned>(raw: &RawReference) -> Result<T, DocumentError> {
    let payload_len = raw.payload().map_or(0, Map::len);
    let mut merged = Map::with_capacity(2 + payload_len);

    merged.insert("id".to_string(), Value::String(raw.id().to_string()));
    merged.insert(
        "type".to_string(),
        Value::String(raw.object_type().to_string()),
    );

    if let Some(payload) = raw.payload() {
        for (key, value) in payload {
            merged.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(Value::Object(merged)).map_err(|source| DocumentError::Decode {
        id: raw.id(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmx_id::Id;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Panel {
        id: Id,
        #[serde(rename = "type")]
        object_type: String,
        name: String,
        floor: i32,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct NameOnly {
        name: String,
    }

    fn raw(value: serde_json::Value) -> RawReference {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_envelope_and_payload_merge() {
        let panel: Panel = decode_reference(&raw(json!({
            "id": "7",
            "type": "panels",
            "name": "A"
        })))
        .unwrap();

        assert_eq!(
            panel,
            Panel {
                id: Id::new(7),
                object_type: "panels".to_string(),
                name: "A".to_string(),
                floor: 0,
            }
        );
    }

    #[test]
    fn test_entity_without_identity_fields() {
        let entity: NameOnly =
            decode_reference(&raw(json!({"id": "7", "type": "panels", "name": "A"}))).unwrap();
        assert_eq!(entity.name, "A");
    }

    #[test]
    fn test_bare_pointer_decodes_identity_only() {
        let panel: Panel =
            decode_reference(&RawReference::pointer(Id::new(3), "panels")).unwrap();
        assert_eq!(panel.id, Id::new(3));
        assert_eq!(panel.object_type, "panels");
        assert!(panel.name.is_empty());
    }

    #[test]
    fn test_type_mismatch_names_the_id() {
        let err = decode_reference::<Panel>(&raw(json!({
            "id": "9",
            "type": "panels",
            "floor": "third"
        })))
        .unwrap_err();

        assert!(matches!(err, DocumentError::Decode { .. }));
        assert_eq!(err.id(), Id::new(9));
        assert!(err.to_string().contains("object 9"));
    }

    #[test]
    fn test_decoding_twice_gives_equal_values() {
        let reference = raw(json!({"id": "7", "type": "panels", "name": "A"}));
        let first: Panel = decode_reference(&reference).unwrap();
        let second: Panel = decode_reference(&reference).unwrap();
        assert_eq!(first, second);
    }
}
