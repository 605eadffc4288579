//! Typed front-matter values.
//!
//! [`TypedValue`] is the tagged union every front-matter value is decoded
//! into. Equality and ordering are kind-aware and total: comparing values of
//! different kinds is never an error, it is simply `false` (or `None` for
//! [`TypedValue::compare`]).
//!
//! `null` has no typed counterpart. Wherever it appears, in front matter or
//! in schema documents, it means "absent": map entries and sequence items
//! that are `null` are dropped, and `null` in an `Option<TypedValue>` slot
//! decodes to `None`.

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{SerializeMap, SerializeSeq},
};
use std::{cmp::Ordering, collections::BTreeMap, fmt};

/// A string-keyed map of typed values (front matter, query fields).
pub type ValueMap = BTreeMap<String, TypedValue>;

/// A dynamically typed front-matter value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Seconds since the UNIX epoch.
    Date(f64),
    Array(Vec<TypedValue>),
    Map(ValueMap),
}

/// Kind tag of a [`TypedValue`], used in diagnostics and sort grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValueKind {
    Bool,
    Int,
    Double,
    String,
    Date,
    Array,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::String => "string",
            Self::Date => "date",
            Self::Array => "array",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

impl TypedValue {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::Date(_) => ValueKind::Date,
            Self::Array(_) => ValueKind::Array,
            Self::Map(_) => ValueKind::Map,
        }
    }

    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Ordering between two values of the same scalar kind.
    ///
    /// Returns `None` for cross-kind pairs, arrays and maps.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Double(a), Self::Double(b)) | (Self::Date(a), Self::Date(b)) => {
                a.partial_cmp(b)
            }
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Values of different kinds are grouped by kind; within a kind the
    /// natural order applies (`NaN` sorts after every other double).
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Double(a), Self::Double(b)) | (Self::Date(a), Self::Date(b)) => a.total_cmp(b),
            (Self::Array(a), Self::Array(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.sort_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Self::Map(a), Self::Map(b)) => a
                .iter()
                .zip(b)
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| va.sort_cmp(vb)))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.kind().cmp(&other.kind())),
        }
    }

    /// Decode a YAML value. `null` has no typed counterpart and yields `None`.
    pub fn from_yaml(value: serde_yaml::Value) -> Option<Self> {
        use serde_yaml::Value as Yaml;
        match value {
            Yaml::Null => None,
            Yaml::Bool(b) => Some(Self::Bool(b)),
            Yaml::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Double)),
            Yaml::String(s) => Some(Self::String(s)),
            Yaml::Sequence(items) => Some(Self::Array(
                items.into_iter().filter_map(Self::from_yaml).collect(),
            )),
            Yaml::Mapping(mapping) => Some(Self::Map(
                mapping
                    .into_iter()
                    .filter_map(|(k, v)| Some((yaml_key(k)?, Self::from_yaml(v)?)))
                    .collect(),
            )),
            Yaml::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }

    /// Convert to JSON. Dates become their epoch-seconds number.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Double(d) | Self::Date(d) => Json::from(*d),
            Self::String(s) => Json::String(s.clone()),
            Self::Array(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Stringify a YAML mapping key; only scalar keys are kept.
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => Some(s),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for TypedValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for TypedValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl<T: Into<TypedValue>> From<Vec<T>> for TypedValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Serde
// ============================================================================

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Double(d) | Self::Date(d) => serializer.serialize_f64(*d),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

struct TypedValueVisitor;

impl<'de> Visitor<'de> for TypedValueVisitor {
    type Value = TypedValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-null bool, number, string, sequence or map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(TypedValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(TypedValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or(TypedValue::Double(v as f64), TypedValue::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(TypedValue::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(TypedValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(TypedValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Option<TypedValue>>()? {
            items.extend(item);
        }
        Ok(TypedValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = ValueMap::new();
        while let Some((k, v)) = access.next_entry::<String, Option<TypedValue>>()? {
            if let Some(v) = v {
                map.insert(k, v);
            }
        }
        Ok(TypedValue::Map(map))
    }
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TypedValueVisitor)
    }
}

// ============================================================================
// Tests
// ============================================================================
