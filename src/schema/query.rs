//! Query declarations and the condition DSL.
//!
//! # Example
//! ```yaml
//! contentType: post
//! scope: list
//! limit: 5
//! filter:
//!   and:
//!     - key: featured
//!       operator: equals
//!       value: true
//!     - key: authors
//!       operator: matching
//!       value: "{{authors}}"
//! orderBy:
//!   - key: publication
//!     direction: desc
//! ```

use super::value::TypedValue;
use serde::{Deserialize, Serialize};

/// Sort direction of an [`Order`] entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Order {
    pub key: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Order {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Direction::Desc,
        }
    }
}

/// Comparison operator of a field condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    Like,
    CaseInsensitiveLike,
    In,
    Contains,
    Matching,
}

/// Boolean condition tree evaluated against a content's query fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// A `null` or missing value matches nothing.
    Field {
        key: String,
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<TypedValue>,
    },
    And {
        and: Vec<Condition>,
    },
    Or {
        or: Vec<Condition>,
    },
}

impl Condition {
    pub fn field(key: impl Into<String>, operator: Operator, value: impl Into<TypedValue>) -> Self {
        Self::Field {
            key: key.into(),
            operator,
            value: Some(value.into()),
        }
    }
}

/// A query over one content type's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Query {
    pub content_type: String,

    /// Scope used when the results are exposed in a context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Order>,
}

impl Query {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            scope: None,
            limit: None,
            offset: None,
            filter: None,
            order_by: Vec::new(),
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order_by.push(order);
        self
    }

    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}
