//! Build-wide consistency checks.
//!
//! | Check                                  | Severity | Result                      |
//! |----------------------------------------|----------|-----------------------------|
//! | duplicate content type ids             | fatal    | [`ValidationError`]         |
//! | zero or multiple default content types | fatal    | [`ValidationError`]         |
//! | duplicate pipeline ids                 | fatal    | [`ValidationError`]         |
//! | duplicate content slugs                | fatal    | [`ValidationError`]         |
//! | query/iterator on unknown content type | warning  | [`Warning`], empty results  |
//! | relation to a missing content          | warning  | [`Warning`], target skipped |
//!
//! Fatal checks run after phase 1 and before any rendering. Every check
//! reports all offenders at once.

use crate::{
    content::{Content, ContentStore},
    error::{BuildError, ValidationError, Warning},
    schema::{ContentDefinition, RenderPipeline},
};
use std::collections::{BTreeMap, BTreeSet};

/// Run every fatal check, collecting all failures.
pub fn validate(
    definitions: &[ContentDefinition],
    pipelines: &[RenderPipeline],
    contents: &[Content],
) -> Result<(), BuildError> {
    let mut errors = Vec::new();

    let type_ids = duplicates(definitions.iter().map(|d| d.id.as_str()));
    if !type_ids.is_empty() {
        errors.push(ValidationError::DuplicateContentTypes(type_ids));
    }

    let defaults: Vec<String> = definitions
        .iter()
        .filter(|d| d.is_default)
        .map(|d| d.id.clone())
        .collect();
    match defaults.len() {
        0 => errors.push(ValidationError::NoDefaultContentType),
        1 => {}
        _ => errors.push(ValidationError::MultipleDefaultContentTypes(defaults)),
    }

    let pipeline_ids = duplicates(pipelines.iter().map(|p| p.id.as_str()));
    if !pipeline_ids.is_empty() {
        errors.push(ValidationError::DuplicatePipelines(pipeline_ids));
    }

    let slugs = duplicates(contents.iter().map(|c| c.slug.as_str()));
    if !slugs.is_empty() {
        errors.push(ValidationError::DuplicateSlugs(slugs));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BuildError::Validation(errors))
    }
}

/// Every value occurring more than once, sorted and deduplicated.
fn duplicates<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(value, _)| value.to_owned())
        .collect()
}

/// Warn once per unknown content type named by a query, iterator or relation.
pub fn unknown_content_types(
    definitions: &[ContentDefinition],
    pipelines: &[RenderPipeline],
) -> Vec<Warning> {
    let known: BTreeSet<&str> = definitions.iter().map(|d| d.id.as_str()).collect();

    let referenced = definitions
        .iter()
        .flat_map(|d| {
            d.queries
                .values()
                .map(|q| q.content_type.as_str())
                .chain(d.relations.values().map(|r| r.references.as_str()))
        })
        .chain(pipelines.iter().flat_map(|p| {
            p.named_queries
                .values()
                .map(|q| q.content_type.as_str())
                .chain(p.iterators.values().map(|i| i.content_type.as_str()))
        }));

    referenced
        .filter(|id| !known.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|id| Warning::UnknownContentType(id.to_owned()).emit())
        .collect()
}

/// Warn for every relation identifier with no matching content.
pub fn unresolved_relations(store: &ContentStore) -> Vec<Warning> {
    let mut contents: Vec<&Content> = store.iter().collect();
    contents.sort_by(|a, b| a.id.cmp(&b.id));

    contents
        .into_iter()
        .flat_map(move |content| {
            content.relations.iter().flat_map(move |(key, relation)| {
                relation
                    .identifiers
                    .iter()
                    .filter(move |id| store.get(&relation.target_type, id).is_none())
                    .map(move |id| {
                        Warning::UnresolvedRelation {
                            content: content.id.clone(),
                            key: key.clone(),
                            target: relation.target_type.clone(),
                            id: id.clone(),
                        }
                        .emit()
                    })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        content::RelationValue,
        fixtures::content,
        schema::{IteratorConfig, OutputConfig, Query, Relation, RelationType},
    };

    fn pipeline(id: &str) -> RenderPipeline {
        RenderPipeline::new(
            id,
            "json",
            OutputConfig {
                path: "{{slug}}".into(),
                file: "index".into(),
                ext: "json".into(),
            },
        )
    }

    #[test]
    fn test_valid_site() {
        let definitions = [
            ContentDefinition::new("page").default_type(),
            ContentDefinition::new("post"),
        ];
        let contents = [content("page", "about"), content("post", "blog/a")];
        assert!(validate(&definitions, &[pipeline("html")], &contents).is_ok());
    }

    #[test]
    fn test_reports_every_failure() {
        let definitions = [
            ContentDefinition::new("post"),
            ContentDefinition::new("post"),
            ContentDefinition::new("tag"),
            ContentDefinition::new("tag"),
        ];
        let pipelines = [pipeline("html"), pipeline("html"), pipeline("rss")];
        let contents = [
            content("post", "blog/a"),
            content("post", "blog/a"),
            content("post", "blog/b"),
            content("tag", "x"),
            content("tag", "x"),
        ];

        let Err(BuildError::Validation(errors)) = validate(&definitions, &pipelines, &contents)
        else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateContentTypes(vec!["post".into(), "tag".into()]),
                ValidationError::NoDefaultContentType,
                ValidationError::DuplicatePipelines(vec!["html".into()]),
                ValidationError::DuplicateSlugs(vec!["blog/a".into(), "x".into()]),
            ]
        );
    }

    #[test]
    fn test_multiple_defaults_listed() {
        let definitions = [
            ContentDefinition::new("page").default_type(),
            ContentDefinition::new("post").default_type(),
        ];
        let Err(BuildError::Validation(errors)) = validate(&definitions, &[], &[]) else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors,
            vec![ValidationError::MultipleDefaultContentTypes(vec![
                "page".into(),
                "post".into()
            ])]
        );
    }

    #[test]
    fn test_unknown_content_types_reported_once() {
        let definitions = [ContentDefinition::new("post")
            .default_type()
            .relation("authors", Relation::new("author", RelationType::Many))
            .query("related", Query::new("post"))];
        let mut html = pipeline("html");
        html.named_queries.insert("a".into(), Query::new("author"));
        html.named_queries.insert("b".into(), Query::new("ghost"));
        html.iterators.insert(
            "tag.pagination".into(),
            IteratorConfig {
                content_type: "tag".into(),
                limit: 10,
                filter: None,
                order_by: Vec::new(),
            },
        );

        let warnings = unknown_content_types(&definitions, &[html]);
        let ids: Vec<String> = warnings
            .iter()
            .map(|w| match w {
                Warning::UnknownContentType(id) => id.clone(),
                other => panic!("unexpected {other}"),
            })
            .collect();
        assert_eq!(ids, ["author", "ghost", "tag"]);
    }

    #[test]
    fn test_unresolved_relations() {
        let mut post = content("post", "blog/a");
        post.relations.insert(
            "authors".into(),
            RelationValue {
                target_type: "author".into(),
                relation_type: RelationType::Many,
                identifiers: vec!["authors/x".into(), "authors/ghost".into()],
            },
        );
        let store = ContentStore::new(
            &[ContentDefinition::new("post"), ContentDefinition::new("author")],
            vec![post, content("author", "authors/x")],
        );

        let warnings = unresolved_relations(&store);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::UnresolvedRelation { id, key, .. } if id == "authors/ghost" && key == "authors"
        ));
    }
}
