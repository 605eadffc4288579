//! Relation resolution.
//!
//! Stores target identifiers only. Targets are looked up through the
//! [`ContentStore`](super::ContentStore) when a context is assembled.

use super::{Content, RelationValue};
use crate::schema::{ContentDefinition, RelationType, TypedValue};

/// Attach a [`RelationValue`] for every relation the definition declares.
///
/// The front-matter value may be a single identifier or a list. `one`
/// relations keep the first identifier; `many` relations keep the list in
/// order, duplicates included. Non-string entries are ignored.
pub fn resolve_relations(content: &mut Content, definition: &ContentDefinition) {
    for (key, relation) in &definition.relations {
        let mut identifiers: Vec<String> = match content.raw_front_matter.get(key) {
            Some(TypedValue::String(id)) => vec![id.clone()],
            Some(TypedValue::Array(items)) => items
                .iter()
                .filter_map(TypedValue::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        if relation.relation_type == RelationType::One {
            identifiers.truncate(1);
        }

        content.relations.insert(
            key.clone(),
            RelationValue {
                target_type: relation.references.clone(),
                relation_type: relation.relation_type,
                identifiers,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures::content, schema::Relation};

    fn definition() -> ContentDefinition {
        ContentDefinition::new("post")
            .relation("authors", Relation::new("author", RelationType::Many))
            .relation("category", Relation::new("category", RelationType::One))
            .relation("series", Relation::new("series", RelationType::One))
    }

    #[test]
    fn test_many_keeps_order_and_duplicates() {
        let mut post = content("post", "blog/a");
        post.raw_front_matter
            .insert("authors".into(), vec!["b", "a", "b"].into());
        resolve_relations(&mut post, &definition());

        let authors = &post.relations["authors"];
        assert_eq!(authors.target_type, "author");
        assert_eq!(authors.identifiers, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_one_truncates_to_first() {
        let mut post = content("post", "blog/a");
        post.raw_front_matter
            .insert("category".into(), vec!["x", "y"].into());
        post.raw_front_matter.insert("series".into(), "s1".into());
        resolve_relations(&mut post, &definition());

        assert_eq!(post.relations["category"].identifiers, vec!["x"]);
        assert_eq!(post.relations["series"].identifiers, vec!["s1"]);
    }

    #[test]
    fn test_missing_relation_is_empty() {
        let mut post = content("post", "blog/a");
        resolve_relations(&mut post, &definition());
        assert!(post.relations["authors"].identifiers.is_empty());
        assert_eq!(post.relations["category"].to_field(), None);
    }
}
