//! Firestore REST "typed value" JSON.
//!
//! Documents come back from the REST API (and in trigger events) as
//! `{"fields": {"text": {"stringValue": "hi"}}}`. These types decode that form
//! into plain JSON so the rest of the service works on untyped documents.

use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

use crate::models::Document;

/// A Firestore document resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl FirestoreDocument {
    pub fn into_document(self) -> Document {
        decode_fields(self.fields)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(Value),
    BooleanValue(bool),
    IntegerValue(String),
    /// A JSON number, or a string for `NaN`/`Infinity`/`-Infinity`
    DoubleValue(Value),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

impl FirestoreValue {
    pub fn into_json(self) -> Value {
        match self {
            FirestoreValue::NullValue(_) => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            // int64 travels as a decimal string
            FirestoreValue::IntegerValue(raw) => match raw.parse::<i64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => Value::String(raw),
            },
            FirestoreValue::DoubleValue(Value::Number(n)) => Value::Number(n),
            // Non-finite doubles have no JSON number form
            FirestoreValue::DoubleValue(Value::String(raw)) => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FirestoreValue::DoubleValue(_) => Value::Null,
            FirestoreValue::TimestampValue(s)
            | FirestoreValue::StringValue(s)
            | FirestoreValue::BytesValue(s)
            | FirestoreValue::ReferenceValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(p) => serde_json::json!({
                "latitude": p.latitude,
                "longitude": p.longitude,
            }),
            FirestoreValue::ArrayValue(a) => {
                Value::Array(a.values.into_iter().map(FirestoreValue::into_json).collect())
            }
            FirestoreValue::MapValue(m) => Value::Object(decode_fields(m.fields)),
        }
    }
}

fn decode_fields(fields: HashMap<String, FirestoreValue>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key, value.into_json()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_message_document() {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/chats/c1/messages/m1",
            "fields": {
                "author": { "mapValue": { "fields": { "id": { "stringValue": "A" } } } },
                "text": { "stringValue": "hi" },
                "createdAt": { "integerValue": "1700000000000" }
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        });

        let document: FirestoreDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(
            document.name.as_deref(),
            Some("projects/p/databases/(default)/documents/chats/c1/messages/m1")
        );

        let decoded = Value::Object(document.into_document());
        assert_eq!(
            decoded,
            json!({
                "author": { "id": "A" },
                "text": "hi",
                "createdAt": 1700000000000i64
            })
        );
    }

    #[test]
    fn test_decode_scalars_and_containers() {
        let raw = json!({
            "fields": {
                "participants": { "arrayValue": { "values": [
                    { "stringValue": "A" }, { "stringValue": "B" }
                ] } },
                "empty": { "arrayValue": {} },
                "emptyMap": { "mapValue": {} },
                "muted": { "booleanValue": false },
                "score": { "doubleValue": 1.5 },
                "gone": { "nullValue": null },
                "owner": { "referenceValue": "projects/p/databases/(default)/documents/users/A" },
                "at": { "timestampValue": "2024-05-01T10:00:00Z" },
                "where": { "geoPointValue": { "latitude": 1.0, "longitude": 2.0 } },
                "huge": { "integerValue": "not-a-number" }
            }
        });

        let document: FirestoreDocument = serde_json::from_value(raw).unwrap();
        let decoded = document.into_document();

        assert_eq!(decoded["participants"], json!(["A", "B"]));
        assert_eq!(decoded["empty"], json!([]));
        assert_eq!(decoded["emptyMap"], json!({}));
        assert_eq!(decoded["muted"], json!(false));
        assert_eq!(decoded["score"], json!(1.5));
        assert_eq!(decoded["gone"], Value::Null);
        assert_eq!(
            decoded["owner"],
            json!("projects/p/databases/(default)/documents/users/A")
        );
        assert_eq!(decoded["at"], json!("2024-05-01T10:00:00Z"));
        assert_eq!(decoded["where"], json!({"latitude": 1.0, "longitude": 2.0}));
        assert_eq!(decoded["huge"], json!("not-a-number"));
    }

    #[test]
    fn test_decode_non_finite_doubles() {
        let raw = json!({
            "fields": {
                "nan": { "doubleValue": "NaN" },
                "inf": { "doubleValue": "Infinity" },
                "negInf": { "doubleValue": "-Infinity" },
                "quoted": { "doubleValue": "2.5" },
                "fcmToken": { "stringValue": "tok123" }
            }
        });

        let document: FirestoreDocument = serde_json::from_value(raw).unwrap();
        let decoded = document.into_document();

        assert_eq!(decoded["nan"], Value::Null);
        assert_eq!(decoded["inf"], Value::Null);
        assert_eq!(decoded["negInf"], Value::Null);
        assert_eq!(decoded["quoted"], json!(2.5));
        assert_eq!(decoded["fcmToken"], json!("tok123"));
    }

    #[test]
    fn test_document_without_fields() {
        let document: FirestoreDocument = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(document.into_document().is_empty());
    }
}
