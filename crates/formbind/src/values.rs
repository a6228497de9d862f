//! Raw form values
//!
//! The form keeps its value as a JSON document so that states the typed value
//! cannot hold (missing fields, a string where a number belongs, a negative
//! quantity) remain representable while the user is still editing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::{FieldPath, Segment};

/// Furthest an index write may reach past the end of an array
///
/// Indices beyond it are stored as object keys instead of padding the array
/// with nulls.
const MAX_ARRAY_GAP: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(Value);

impl FormValues {
    /// Empty object
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_typed<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self)
    }

    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.0)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(&self.0, |current, segment| match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
                _ => None,
            })
    }

    /// Write `value` at `path`, creating containers along the way
    ///
    /// A scalar sitting where a container is needed gets replaced. An index
    /// too far past the end of an array turns that array into an object keyed
    /// by position, so the write never allocates unbounded padding.
    pub fn set(&mut self, path: &FieldPath, value: Value) {
        set_in(&mut self.0, path.segments(), value);
    }
}

impl Default for FormValues {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for FormValues {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn set_in(target: &mut Value, segments: &[Segment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    match head {
        Segment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                set_in(map.entry(key.clone()).or_insert(Value::Null), rest, value);
            }
        }
        Segment::Index(index) => {
            let index = *index;
            let len = target.as_array().map_or(0, Vec::len);
            if index.saturating_sub(len) > MAX_ARRAY_GAP {
                *target = Value::Object(into_keyed(target.take()));
            }
            if let Value::Object(map) = target {
                set_in(
                    map.entry(index.to_string()).or_insert(Value::Null),
                    rest,
                    value,
                );
                return;
            }
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                set_in(&mut items[index], rest, value);
            }
        }
    }
}

/// Entries keyed by position; objects pass through and scalars are dropped
fn into_keyed(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let values = FormValues::from_value(json!({
            "address": { "city": "Oslo" },
            "items": [{ "qty": 2 }]
        }));

        assert_eq!(values.get(&"address.city".into()), Some(&json!("Oslo")));
        assert_eq!(values.get(&"items.0.qty".into()), Some(&json!(2)));
        assert_eq!(values.get(&"items.1.qty".into()), None);
        assert_eq!(values.get(&"address.city.zip".into()), None);
        assert_eq!(values.get(&FieldPath::root()), Some(values.as_value()));
    }

    #[test]
    fn test_set_creates_containers() {
        let mut values = FormValues::new();
        values.set(&"address.city".into(), json!("Bergen"));
        values.set(&"items.1.qty".into(), json!(5));

        assert_eq!(
            values.into_value(),
            json!({
                "address": { "city": "Bergen" },
                "items": [null, { "qty": 5 }]
            })
        );
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut values = FormValues::from_value(json!({ "address": "unknown" }));
        values.set(&"address.city".into(), json!("Bergen"));
        assert_eq!(values.get(&"address.city".into()), Some(&json!("Bergen")));
    }

    #[test]
    fn test_set_far_index_uses_object_keys() {
        let mut values = FormValues::new();
        values.set(&"tags.18446744073709551615".into(), json!("x"));
        assert_eq!(
            values.as_value(),
            &json!({ "tags": { "18446744073709551615": "x" } })
        );
        assert_eq!(
            values.get(&"tags.18446744073709551615".into()),
            Some(&json!("x"))
        );
    }

    #[test]
    fn test_set_far_index_keeps_existing_items() {
        let mut values = FormValues::from_value(json!({ "tags": ["a", "b"] }));
        values.set(&"tags.100000000000".into(), json!("z"));

        assert_eq!(values.get(&"tags.1".into()), Some(&json!("b")));
        assert_eq!(values.get(&"tags.100000000000".into()), Some(&json!("z")));

        // Just past the end still grows the array
        let mut values = FormValues::from_value(json!({ "tags": ["a"] }));
        values.set(&"tags.3".into(), json!("d"));
        assert_eq!(values.as_value(), &json!({ "tags": ["a", null, null, "d"] }));
    }

    #[test]
    fn test_set_root_replaces_everything() {
        let mut values = FormValues::from_value(json!({ "a": 1 }));
        values.set(&FieldPath::root(), json!({ "b": 2 }));
        assert_eq!(values.as_value(), &json!({ "b": 2 }));
    }

    #[test]
    fn test_typed_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Login {
            user: String,
        }

        let values = FormValues::from_typed(&Login { user: "ana".into() }).unwrap();
        assert_eq!(values.to_typed::<Login>().unwrap(), Login { user: "ana".into() });
        assert!(FormValues::new().to_typed::<Login>().is_err());
    }
}
