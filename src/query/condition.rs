//! Condition evaluation.
//!
//! A [`Condition`] is first bound to a parameter table, replacing every
//! `{{name}}` literal with the caller's query field of that name, then
//! evaluated against each candidate's query fields.
//!
//! String values that parse as dates in the build's [`DateLocale`] also
//! carry their date reading, which is used when the candidate field is a
//! date. `{key: publication, operator: greaterThan, value: '2024-01-01'}`
//! therefore compares dates, not strings.

use crate::{
    schema::{Condition, Operator, TypedValue, ValueMap},
    utils::{date::DateLocale, placeholder::placeholder_name},
};

/// A condition whose placeholders have been substituted.
///
/// A `None` value is a placeholder with no matching parameter; such a field
/// condition matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundCondition {
    Field {
        key: String,
        operator: Operator,
        value: Option<TypedValue>,
        /// `value` read as a date, compared against date fields
        date: Option<TypedValue>,
    },
    And(Vec<BoundCondition>),
    Or(Vec<BoundCondition>),
}

/// Substitute `{{name}}` literals from `parameters`.
///
/// Placeholders inside array literals are substituted element-wise; an
/// unresolved element is dropped.
pub fn bind(condition: &Condition, parameters: &ValueMap, locale: &DateLocale) -> BoundCondition {
    match condition {
        Condition::Field {
            key,
            operator,
            value,
        } => {
            let value = value.as_ref().and_then(|v| substitute(v, parameters));
            let date = value.as_ref().and_then(|v| as_date(v, locale));
            BoundCondition::Field {
                key: key.clone(),
                operator: *operator,
                value,
                date,
            }
        }
        Condition::And { and } => {
            BoundCondition::And(and.iter().map(|c| bind(c, parameters, locale)).collect())
        }
        Condition::Or { or } => {
            BoundCondition::Or(or.iter().map(|c| bind(c, parameters, locale)).collect())
        }
    }
}

/// Date reading of a string value, element-wise for arrays.
fn as_date(value: &TypedValue, locale: &DateLocale) -> Option<TypedValue> {
    match value {
        TypedValue::String(s) => locale.parse(s, None).map(TypedValue::Date),
        TypedValue::Array(items) => {
            let dates = items
                .iter()
                .map(|item| as_date(item, locale))
                .collect::<Option<Vec<_>>>()?;
            Some(TypedValue::Array(dates))
        }
        _ => None,
    }
}

fn substitute(value: &TypedValue, parameters: &ValueMap) -> Option<TypedValue> {
    match value {
        TypedValue::String(s) => match placeholder_name(s) {
            Some(name) => parameters.get(name).cloned(),
            None => Some(value.clone()),
        },
        TypedValue::Array(items) => Some(TypedValue::Array(
            items
                .iter()
                .filter_map(|item| substitute(item, parameters))
                .collect(),
        )),
        _ => Some(value.clone()),
    }
}

impl BoundCondition {
    /// Evaluate against one content's query fields.
    ///
    /// `and`/`or` short-circuit; an empty `and` is true, an empty `or` false.
    pub fn matches(&self, fields: &ValueMap) -> bool {
        match self {
            Self::Field {
                key,
                operator,
                value,
                date,
            } => {
                let lhs = fields.get(key);
                let rhs = match lhs {
                    Some(TypedValue::Date(_)) => date.as_ref().or(value.as_ref()),
                    Some(TypedValue::Array(items))
                        if items.iter().any(|i| matches!(i, TypedValue::Date(_))) =>
                    {
                        date.as_ref().or(value.as_ref())
                    }
                    _ => value.as_ref(),
                };
                match (lhs, rhs) {
                    (Some(lhs), Some(rhs)) => compare(lhs, *operator, rhs),
                    _ => false,
                }
            }
            Self::And(conditions) => conditions.iter().all(|c| c.matches(fields)),
            Self::Or(conditions) => conditions.iter().any(|c| c.matches(fields)),
        }
    }
}

/// Apply one operator. Cross-kind comparisons are `false`.
pub fn compare(lhs: &TypedValue, operator: Operator, rhs: &TypedValue) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};

    match operator {
        Operator::Equals => lhs == rhs,
        Operator::NotEquals => lhs.kind() == rhs.kind() && lhs != rhs,
        Operator::LessThan => lhs.compare(rhs) == Some(Less),
        Operator::GreaterThan => lhs.compare(rhs) == Some(Greater),
        Operator::LessOrEqual => matches!(lhs.compare(rhs), Some(Less | Equal)),
        Operator::GreaterOrEqual => matches!(lhs.compare(rhs), Some(Greater | Equal)),
        Operator::Like => match (lhs, rhs) {
            (TypedValue::String(l), TypedValue::String(r)) => l.contains(r.as_str()),
            _ => false,
        },
        Operator::CaseInsensitiveLike => match (lhs, rhs) {
            (TypedValue::String(l), TypedValue::String(r)) => {
                l.to_lowercase().contains(&r.to_lowercase())
            }
            _ => false,
        },
        Operator::In => {
            lhs.is_scalar() && rhs.as_array().is_some_and(|items| items.contains(lhs))
        }
        Operator::Contains => {
            rhs.is_scalar() && lhs.as_array().is_some_and(|items| items.contains(rhs))
        }
        Operator::Matching => {
            let left = as_set(lhs);
            let right = as_set(rhs);
            left.iter().any(|item| right.contains(item))
        }
    }
}

/// Array items, or a scalar as a one-element set.
fn as_set(value: &TypedValue) -> &[TypedValue] {
    match value {
        TypedValue::Array(items) => items,
        TypedValue::Map(_) => &[],
        scalar => std::slice::from_ref(scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> DateLocale {
        DateLocale::default()
    }

    fn fields(pairs: &[(&str, TypedValue)]) -> ValueMap {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
    }

    #[test]
    fn test_equality_operators() {
        let a = TypedValue::Int(1);
        assert!(compare(&a, Operator::Equals, &TypedValue::Int(1)));
        assert!(!compare(&a, Operator::Equals, &TypedValue::Double(1.0)));
        assert!(compare(&a, Operator::NotEquals, &TypedValue::Int(2)));
        // cross-kind is false for both
        assert!(!compare(&a, Operator::NotEquals, &TypedValue::from("1")));
    }

    #[test]
    fn test_ordering_operators() {
        let five = TypedValue::Int(5);
        assert!(compare(&five, Operator::LessThan, &TypedValue::Int(6)));
        assert!(compare(&five, Operator::LessOrEqual, &TypedValue::Int(5)));
        assert!(compare(&five, Operator::GreaterOrEqual, &TypedValue::Int(5)));
        assert!(!compare(&five, Operator::GreaterThan, &TypedValue::Int(5)));
        assert!(!compare(&five, Operator::LessThan, &TypedValue::Double(6.0)));
        assert!(compare(
            &TypedValue::from("apple"),
            Operator::LessThan,
            &TypedValue::from("banana")
        ));
        assert!(compare(
            &TypedValue::Date(10.0),
            Operator::GreaterThan,
            &TypedValue::Date(5.0)
        ));
    }

    #[test]
    fn test_like_operators() {
        let title = TypedValue::from("Learning Rust");
        assert!(compare(&title, Operator::Like, &TypedValue::from("Rust")));
        assert!(!compare(&title, Operator::Like, &TypedValue::from("rust")));
        assert!(compare(
            &title,
            Operator::CaseInsensitiveLike,
            &TypedValue::from("rUST")
        ));
        assert!(!compare(&TypedValue::Int(1), Operator::Like, &TypedValue::from("1")));
    }

    #[test]
    fn test_in_and_contains() {
        let tags = TypedValue::from(vec!["a", "b"]);
        assert!(compare(&TypedValue::from("a"), Operator::In, &tags));
        assert!(!compare(&TypedValue::from("c"), Operator::In, &tags));
        assert!(compare(&tags, Operator::Contains, &TypedValue::from("b")));
        assert!(!compare(&tags, Operator::Contains, &TypedValue::from("z")));
        assert!(!compare(&tags, Operator::In, &tags));
    }

    #[test]
    fn test_matching_is_set_intersection() {
        let mine = TypedValue::from(vec!["t1", "t2", "t3"]);
        let shares_one = TypedValue::from(vec!["t9", "t3"]);
        let shares_none = TypedValue::from(vec!["t7", "t8"]);
        assert!(compare(&mine, Operator::Matching, &shares_one));
        assert!(!compare(&mine, Operator::Matching, &shares_none));

        // independent of ordering
        let reversed = TypedValue::from(vec!["t3", "t9"]);
        assert_eq!(
            compare(&mine, Operator::Matching, &shares_one),
            compare(&mine, Operator::Matching, &reversed)
        );
        assert!(!compare(&mine, Operator::Matching, &TypedValue::from(Vec::<String>::new())));
    }

    #[test]
    fn test_placeholder_equals_literal() {
        let params = fields(&[("authors", TypedValue::from(vec!["a1", "a2"]))]);
        let with_placeholder = Condition::field("authors", Operator::Matching, "{{authors}}");
        let literal = Condition::field("authors", Operator::Matching, vec!["a1", "a2"]);

        assert_eq!(bind(&with_placeholder, &params, &utc()), bind(&literal, &params, &utc()));

        let candidates = [
            fields(&[("authors", TypedValue::from(vec!["a2"]))]),
            fields(&[("authors", TypedValue::from(vec!["a3"]))]),
            fields(&[]),
        ];
        for candidate in &candidates {
            assert_eq!(
                bind(&with_placeholder, &params, &utc()).matches(candidate),
                bind(&literal, &params, &utc()).matches(candidate)
            );
        }
    }

    #[test]
    fn test_unresolved_placeholder_matches_nothing() {
        let condition = bind(
            &Condition::field("slug", Operator::NotEquals, "{{missing}}"),
            &ValueMap::new(),
            &utc(),
        );
        assert!(!condition.matches(&fields(&[("slug", "x".into())])));
    }

    #[test]
    fn test_placeholder_inside_array_literal() {
        let params = fields(&[("id", TypedValue::from("blog/a"))]);
        let bound = bind(
            &Condition::field("id", Operator::In, vec!["{{id}}", "{{nope}}", "blog/z"]),
            &params,
            &utc(),
        );
        assert_eq!(
            bound,
            BoundCondition::Field {
                key: "id".into(),
                operator: Operator::In,
                value: Some(TypedValue::from(vec!["blog/a", "blog/z"])),
                date: None,
            }
        );
    }

    #[test]
    fn test_and_or_semantics() {
        let f = fields(&[("featured", true.into()), ("views", TypedValue::Int(3))]);
        let featured = Condition::field("featured", Operator::Equals, true);
        let popular = Condition::field("views", Operator::GreaterThan, 10_i64);

        let and = Condition::And {
            and: vec![featured.clone(), popular.clone()],
        };
        let or = Condition::Or {
            or: vec![featured, popular],
        };
        assert!(!bind(&and, &ValueMap::new(), &utc()).matches(&f));
        assert!(bind(&or, &ValueMap::new(), &utc()).matches(&f));
        assert!(BoundCondition::And(vec![]).matches(&f));
        assert!(!BoundCondition::Or(vec![]).matches(&f));
    }

    #[test]
    fn test_missing_field_is_false() {
        let bound = bind(
            &Condition::field("nope", Operator::NotEquals, 1_i64),
            &ValueMap::new(),
            &utc(),
        );
        assert!(!bound.matches(&ValueMap::new()));
    }

    #[test]
    fn test_date_literal_compares_as_date() {
        let locale = utc();
        let june = locale.parse("1970-06-01", None).unwrap();
        let later = fields(&[("publication", TypedValue::Date(june + 86_400.0))]);
        let earlier = fields(&[("publication", TypedValue::Date(0.0))]);

        let after = bind(
            &Condition::field("publication", Operator::GreaterThan, "1970-06-01"),
            &ValueMap::new(),
            &locale,
        );
        assert!(after.matches(&later));
        assert!(!after.matches(&earlier));

        let on = bind(
            &Condition::field("publication", Operator::Equals, "1970-06-01"),
            &ValueMap::new(),
            &locale,
        );
        assert!(on.matches(&fields(&[("publication", TypedValue::Date(june))])));
    }

    #[test]
    fn test_null_value_matches_nothing() {
        let condition: Condition =
            serde_yaml::from_str("key: code\noperator: notEquals\nvalue: ~").unwrap();
        let bound = bind(&condition, &ValueMap::new(), &utc());
        assert!(!bound.matches(&fields(&[("code", "x".into())])));
    }

    #[test]
    fn test_date_like_string_still_matches_strings() {
        let bound = bind(
            &Condition::field("code", Operator::Equals, "1970-06-01"),
            &ValueMap::new(),
            &utc(),
        );
        assert!(bound.matches(&fields(&[("code", "1970-06-01".into())])));
        assert!(!bound.matches(&fields(&[("code", TypedValue::Int(1))])));
    }
}
