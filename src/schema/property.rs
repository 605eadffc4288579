//! Property declarations of a content type.

use super::value::TypedValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a property.
///
/// # Example
/// ```yaml
/// title:
///   type: string
/// publication:
///   type: date
///   format: "%Y-%m-%d %H:%M"
/// tags:
///   type: array
///   of:
///     type: string
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyType {
    Bool,
    Int,
    Double,
    String,
    Date {
        /// chrono format string; falls back to the build's input format
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    Array { of: Box<PropertyType> },
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Double => f.write_str("double"),
            Self::String => f.write_str("string"),
            Self::Date { .. } => f.write_str("date"),
            Self::Array { of } => write!(f, "array<{of}>"),
        }
    }
}

/// A declared property: its type, whether it is required and its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(flatten)]
    pub kind: PropertyType,

    #[serde(default = "crate::config::defaults::r#true")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<TypedValue>,
}

impl Property {
    pub const fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<TypedValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_defaults_to_required() {
        let prop: Property = serde_yaml::from_str("type: string").unwrap();
        assert_eq!(prop.kind, PropertyType::String);
        assert!(prop.required);
        assert_eq!(prop.default, None);
    }

    #[test]
    fn test_property_nested_array() {
        let prop: Property =
            serde_yaml::from_str("type: array\nof:\n  type: int\nrequired: false\ndefault: [1, 2]")
                .unwrap();
        assert_eq!(
            prop.kind,
            PropertyType::Array {
                of: Box::new(PropertyType::Int)
            }
        );
        assert!(!prop.required);
        assert_eq!(
            prop.default,
            Some(TypedValue::Array(vec![TypedValue::Int(1), TypedValue::Int(2)]))
        );
    }

    #[test]
    fn test_property_null_default() {
        let prop: Property = serde_yaml::from_str("type: string\nrequired: false\ndefault: ~").unwrap();
        assert!(!prop.required);
        assert_eq!(prop.default, None);
    }

    #[test]
    fn test_property_date_format() {
        let prop: Property = serde_yaml::from_str("type: date\nformat: \"%d.%m.%Y\"").unwrap();
        assert_eq!(
            prop.kind,
            PropertyType::Date {
                format: Some("%d.%m.%Y".into())
            }
        );
        assert_eq!(prop.kind.to_string(), "date");
    }
}
