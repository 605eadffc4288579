//! Query execution over the content store.
//!
//! # Pipeline
//!
//! ```text
//! collection(contentType)        unknown type -> Warning, empty result
//!     │
//!     ├── bind(filter, parameters)     {{name}} -> caller's field value,
//!     │                                date strings read in the locale
//!     ├── filter                       BoundCondition::matches
//!     ├── sort::apply(orderBy)         stable, last key first
//!     ├── skip(offset)
//!     └── take(limit)
//! ```
//!
//! Queries never mutate the store and hold no state between runs.

mod condition;
mod sort;

pub use condition::{BoundCondition, bind, compare};

use crate::{
    content::{Content, ContentStore},
    error::Warning,
    schema::{Order, Query, ValueMap},
    utils::date::DateLocale,
};

/// Run `query` against the store.
///
/// `parameters` are the query fields of the content the query runs for;
/// they feed `{{name}}` placeholders in the filter. An unknown content type
/// yields a [`Warning::UnknownContentType`].
pub fn run<'a>(
    query: &Query,
    parameters: &ValueMap,
    store: &'a ContentStore,
    locale: &DateLocale,
) -> Result<Vec<&'a Content>, Warning> {
    let collection = store
        .collection(&query.content_type)
        .ok_or_else(|| Warning::UnknownContentType(query.content_type.clone()))?;
    Ok(select(query, parameters, collection, locale))
}

/// Apply a query's filter, order, offset and limit to `items`.
pub fn select<'a, I>(
    query: &Query,
    parameters: &ValueMap,
    items: I,
    locale: &DateLocale,
) -> Vec<&'a Content>
where
    I: IntoIterator<Item = &'a Content>,
{
    let filter = query.filter.as_ref().map(|c| bind(c, parameters, locale));

    let (contents, fields): (Vec<&Content>, Vec<ValueMap>) = items
        .into_iter()
        .map(|content| (content, content.query_fields()))
        .filter(|(_, fields)| filter.as_ref().is_none_or(|f| f.matches(fields)))
        .unzip();

    sort::apply(contents, &fields, &query.order_by)
        .into_iter()
        .skip(query.offset.unwrap_or(0))
        .take(query.limit.unwrap_or(usize::MAX))
        .collect()
}

/// Order contents by `orders` without filtering.
pub fn order<'a>(contents: Vec<&'a Content>, orders: &[Order]) -> Vec<&'a Content> {
    if orders.is_empty() {
        return contents;
    }
    let fields: Vec<ValueMap> = contents.iter().map(|c| c.query_fields()).collect();
    sort::apply(contents, &fields, orders)
}
