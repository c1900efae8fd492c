use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// A live value observed on an event stream.
///
/// Projections turn the raw arguments of an event occurrence into a `Value`,
/// which is then compared against a [`Spec`](crate::Spec).
///
/// Keyed maps (collections looked up by key, e.g. members by ID) and plain
/// records (objects with named fields) are kept apart so a spec can state
/// which of the two it expects:
///
/// | Variant | Typical source |
/// |---------|----------------|
/// | [`Value::Sequence`] | arrays, lists of embeds or components |
/// | [`Value::Map`] | collections keyed by ID |
/// | [`Value::Record`] | structs, JSON objects |
///
/// An absent value ("undefined") is not a variant. It is represented as
/// `None` wherever a value may be missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<Value>),
    Map(IndexMap<String, Value>),
    Record(IndexMap<String, Value>),
}

/// The runtime category of a [`Value`], used in type mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Sequence,
    Map,
    Record,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "Null",
            ValueKind::Boolean => "Boolean",
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::Sequence => "Sequence",
            ValueKind::Map => "Map",
            ValueKind::Record => "Record",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Build a record from `(field, value)` pairs, keeping their order.
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a keyed map from `(key, value)` entries, keeping their order.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an ordered sequence.
    pub fn seq<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Convert any serializable payload into a `Value`.
    ///
    /// Structs and JSON objects become records; there is no way to produce a
    /// [`Value::Map`] through serde, use [`Value::map`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `serde_json` rejects the payload.
    pub fn from_serialize<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let json = serde_json::to_value(payload).map_err(Error::from)?;
        Ok(Value::from(json))
    }

    /// Returns the runtime category of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Map(_) => ValueKind::Map,
            Value::Record(_) => ValueKind::Record,
        }
    }

    /// Look up a record field or a map entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.get(key),
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Look up a sequence element.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Number of elements in a sequence or entries in a map or record.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Sequence(items) => Some(items.len()),
            Value::Map(entries) | Value::Record(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Compact JSON rendering used in diagnostics.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => serializer.collect_seq(items),
            Value::Map(entries) | Value::Record(entries) => serializer.collect_map(entries),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => Value::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32);

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::seq(items)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_become_records() {
        let value = Value::from(json!({"content": "hi", "embeds": [{"title": "t"}]}));
        assert_eq!(value.kind(), ValueKind::Record);
        assert_eq!(value.get("content"), Some(&Value::from("hi")));
        let embed = value.get("embeds").and_then(|e| e.at(0)).unwrap();
        assert_eq!(embed.get("title").and_then(Value::as_str), Some("t"));
    }

    #[test]
    fn from_serialize_uses_struct_fields() {
        #[derive(Serialize)]
        struct Author {
            id: String,
            bot: bool,
        }

        let value = Value::from_serialize(&Author {
            id: "42".into(),
            bot: true,
        })
        .unwrap();
        assert_eq!(
            value,
            Value::record([("id", Value::from("42")), ("bot", Value::from(true))])
        );
    }

    #[test]
    fn maps_and_records_serialize_as_objects() {
        let map = Value::map([("1", 1), ("2", 2)]);
        assert_eq!(map.to_json(), r#"{"1":1,"2":2}"#);
        assert_eq!(map.kind(), ValueKind::Map);
        assert_eq!(map.len(), Some(2));
        assert_eq!(Value::Null.to_json(), "null");
        assert_eq!(Value::from(1.5).to_json(), "1.5");
    }

    #[test]
    fn option_none_becomes_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(3)), Value::Number(3.0));
    }
}
