//! Front matter → typed [`Content`] conversion.
//!
//! Conversion never fails: every problem becomes a [`Warning`] and the
//! offending value is omitted, so a content may carry a partial property map
//! but never a value of the wrong type.

use super::{Content, RawContent};
use crate::{
    error::Warning,
    schema::{ContentDefinition, PropertyType, TypedValue, ValueKind, ValueMap},
    utils::{date::DateLocale, slug::slugify_id},
};
use std::collections::BTreeMap;

/// Front-matter key that pins a content to a type.
const KEY_TYPE: &str = "type";
/// Front-matter key that overrides the path-derived slug.
const KEY_SLUG: &str = "slug";

/// Why a value was rejected for a property type.
enum Rejection {
    Kind(ValueKind),
    Date { value: String, format: String },
}

/// Pick the definition a raw content belongs to.
///
/// A front-matter `type` naming a definition wins, then the first definition
/// whose `paths` own the content id, then the default definition.
pub fn resolve_definition<'a>(
    raw: &RawContent,
    definitions: &'a [ContentDefinition],
) -> Option<&'a ContentDefinition> {
    let explicit = raw
        .front_matter
        .get(KEY_TYPE)
        .and_then(TypedValue::as_str)
        .and_then(|id| definitions.iter().find(|d| d.id == id));

    explicit
        .or_else(|| definitions.iter().find(|d| d.owns_path(&raw.id)))
        .or_else(|| definitions.iter().find(|d| d.is_default))
}

/// Convert a raw content against its definition.
///
/// Returns the content and the warnings raised while converting it.
pub fn convert(
    raw: RawContent,
    definition: &ContentDefinition,
    locale: &DateLocale,
) -> (Content, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut properties = ValueMap::new();

    for (key, property) in &definition.properties {
        let value = raw
            .front_matter
            .get(key)
            .cloned()
            .or_else(|| property.default.clone());

        let Some(value) = value else {
            if property.required {
                warnings.push(
                    Warning::MissingProperty {
                        content: raw.id.clone(),
                        key: key.clone(),
                    }
                    .emit(),
                );
            }
            continue;
        };

        match coerce(value, &property.kind, locale) {
            Ok(typed) => {
                properties.insert(key.clone(), typed);
            }
            Err(Rejection::Kind(found)) => warnings.push(
                Warning::TypeMismatch {
                    content: raw.id.clone(),
                    key: key.clone(),
                    expected: property.kind.clone(),
                    found,
                }
                .emit(),
            ),
            Err(Rejection::Date { value, format }) => warnings.push(
                Warning::InvalidDate {
                    content: raw.id.clone(),
                    key: key.clone(),
                    value,
                    format,
                }
                .emit(),
            ),
        }
    }

    let user_defined = raw
        .front_matter
        .iter()
        .filter(|(key, _)| {
            !definition.properties.contains_key(*key) && !definition.relations.contains_key(*key)
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let slug = raw
        .front_matter
        .get(KEY_SLUG)
        .and_then(TypedValue::as_str)
        .map(|s| s.trim_matches('/').to_owned())
        .unwrap_or_else(|| slugify_id(&raw.id));

    let content = Content {
        id: raw.id,
        content_type: definition.id.clone(),
        slug,
        origin_path: raw.origin_path,
        last_modified: raw.last_modified,
        raw_front_matter: raw.front_matter,
        body: raw.body,
        properties,
        relations: BTreeMap::new(),
        user_defined,
        iterator: None,
    };
    (content, warnings)
}

/// Check `value` against `kind`, converting where the conversion is lossless
/// (int → double, date string → epoch seconds).
fn coerce(value: TypedValue, kind: &PropertyType, locale: &DateLocale) -> Result<TypedValue, Rejection> {
    match (kind, value) {
        (PropertyType::Bool, v @ TypedValue::Bool(_))
        | (PropertyType::Int, v @ TypedValue::Int(_))
        | (PropertyType::Double, v @ TypedValue::Double(_))
        | (PropertyType::String, v @ TypedValue::String(_))
        | (PropertyType::Date { .. }, v @ TypedValue::Date(_)) => Ok(v),

        #[allow(clippy::cast_precision_loss)]
        (PropertyType::Double, TypedValue::Int(i)) => Ok(TypedValue::Double(i as f64)),

        (PropertyType::Date { format }, TypedValue::String(s)) => {
            let format = format.as_deref();
            locale
                .parse(&s, format)
                .map(TypedValue::Date)
                .ok_or_else(|| Rejection::Date {
                    value: s,
                    format: format.unwrap_or(&locale.format).to_owned(),
                })
        }

        (PropertyType::Array { of }, TypedValue::Array(items)) => items
            .into_iter()
            .map(|item| coerce(item, of, locale))
            .collect::<Result<Vec<_>, _>>()
            .map(TypedValue::Array),

        (_, other) => Err(Rejection::Kind(other.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::raw,
        schema::{Property, Relation, RelationType},
    };

    fn post_definition() -> ContentDefinition {
        ContentDefinition::new("post")
            .path("blog")
            .property("title", Property::new(PropertyType::String))
            .property("views", Property::new(PropertyType::Int).optional())
            .property("rating", Property::new(PropertyType::Double).optional())
            .property(
                "featured",
                Property::new(PropertyType::Bool).with_default(false),
            )
            .property(
                "publication",
                Property::new(PropertyType::Date { format: None }).optional(),
            )
            .property(
                "tags",
                Property::new(PropertyType::Array {
                    of: Box::new(PropertyType::String),
                })
                .optional(),
            )
            .relation("authors", Relation::new("author", RelationType::Many))
    }

    #[test]
    fn test_convert_typed_properties() {
        let raw = raw(
            "blog/hello",
            &[
                ("title", "Hello".into()),
                ("views", TypedValue::Int(3)),
                ("rating", TypedValue::Int(4)),
                ("publication", "2025-01-01".into()),
                ("tags", vec!["a", "b"].into()),
            ],
        );
        let (content, warnings) = convert(raw, &post_definition(), &DateLocale::default());

        assert!(warnings.is_empty());
        assert_eq!(content.content_type, "post");
        assert_eq!(content.slug, "blog/hello");
        assert_eq!(content.properties["title"], TypedValue::from("Hello"));
        assert_eq!(content.properties["views"], TypedValue::Int(3));
        assert_eq!(content.properties["rating"], TypedValue::Double(4.0));
        assert_eq!(content.properties["featured"], TypedValue::Bool(false));
        assert_eq!(
            content.properties["publication"],
            TypedValue::Date(20089.0 * 86400.0)
        );
        assert_eq!(content.properties["tags"], TypedValue::from(vec!["a", "b"]));
    }

    #[test]
    fn test_convert_type_mismatch_is_omitted() {
        let raw = raw(
            "blog/x",
            &[("title", TypedValue::Int(5)), ("tags", vec![TypedValue::Int(1)].into())],
        );
        let (content, warnings) = convert(raw, &post_definition(), &DateLocale::default());

        assert!(!content.properties.contains_key("title"));
        assert!(!content.properties.contains_key("tags"));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| matches!(
            w,
            Warning::TypeMismatch { key, found: ValueKind::Int, .. } if key == "title"
        )));
    }

    #[test]
    fn test_convert_missing_required_property() {
        let (content, warnings) = convert(raw("blog/x", &[]), &post_definition(), &DateLocale::default());
        assert!(!content.properties.contains_key("title"));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], Warning::MissingProperty { key, .. } if key == "title"));
    }

    #[test]
    fn test_convert_invalid_date() {
        let raw = raw(
            "blog/x",
            &[("title", "T".into()), ("publication", "01/01/2025".into())],
        );
        let (content, warnings) = convert(raw, &post_definition(), &DateLocale::default());
        assert!(!content.properties.contains_key("publication"));
        assert!(matches!(
            &warnings[0],
            Warning::InvalidDate { format, .. } if format == "%Y-%m-%d"
        ));
    }

    #[test]
    fn test_convert_user_defined_passthrough() {
        let raw = raw(
            "blog/x",
            &[
                ("title", "T".into()),
                ("authors", vec!["authors/a"].into()),
                ("hero", "img.png".into()),
                ("slug", "/custom/path/".into()),
            ],
        );
        let (content, _) = convert(raw, &post_definition(), &DateLocale::default());
        assert_eq!(content.user_defined["hero"], TypedValue::from("img.png"));
        assert!(!content.user_defined.contains_key("title"));
        assert!(!content.user_defined.contains_key("authors"));
        assert_eq!(content.slug, "custom/path");
    }

    #[test]
    fn test_converted_properties_always_match_declared_type() {
        let def = post_definition();
        let inputs = [
            TypedValue::Bool(true),
            TypedValue::Int(1),
            TypedValue::Double(1.5),
            TypedValue::from("2024-03-01"),
            TypedValue::from(vec!["x"]),
            TypedValue::from(vec![TypedValue::Int(2)]),
        ];
        for input in &inputs {
            let fields: Vec<(&str, TypedValue)> = def
                .properties
                .keys()
                .map(|k| (k.as_str(), input.clone()))
                .collect();
            let (content, _) = convert(raw("blog/x", &fields), &def, &DateLocale::default());
            for (key, value) in &content.properties {
                let ok = matches!(
                    (&def.properties[key].kind, value),
                    (PropertyType::Bool, TypedValue::Bool(_))
                        | (PropertyType::Int, TypedValue::Int(_))
                        | (PropertyType::Double, TypedValue::Double(_))
                        | (PropertyType::String, TypedValue::String(_))
                        | (PropertyType::Date { .. }, TypedValue::Date(_))
                        | (PropertyType::Array { .. }, TypedValue::Array(_))
                );
                assert!(ok, "{key} has mismatched value {value:?}");
            }
        }
    }

    #[test]
    fn test_resolve_definition_order() {
        let defs = vec![
            ContentDefinition::new("page").default_type(),
            post_definition(),
            ContentDefinition::new("author").path("authors"),
        ];
        let by_path = raw("blog/a", &[]);
        assert_eq!(resolve_definition(&by_path, &defs).unwrap().id, "post");

        let explicit = raw("blog/b", &[("type", "author".into())]);
        assert_eq!(resolve_definition(&explicit, &defs).unwrap().id, "author");

        let fallback = raw("about", &[]);
        assert_eq!(resolve_definition(&fallback, &defs).unwrap().id, "page");
    }
}
