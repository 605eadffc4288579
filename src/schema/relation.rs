//! Relation declarations between content types.

use super::query::Order;
use serde::{Deserialize, Serialize};

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// At most one identifier.
    One,
    /// An ordered, non-deduplicated list of identifiers.
    Many,
}

/// A declared relation to another content type.
///
/// # Example
/// ```yaml
/// authors:
///   references: author
///   type: many
///   order:
///     key: name
///     direction: asc
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Relation {
    pub references: String,

    #[serde(rename = "type")]
    pub relation_type: RelationType,

    /// Sort applied to the expanded targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

impl Relation {
    pub fn new(references: impl Into<String>, relation_type: RelationType) -> Self {
        Self {
            references: references.into(),
            relation_type,
            order: None,
        }
    }
}
