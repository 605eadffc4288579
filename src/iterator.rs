//! Iterator page synthesis.
//!
//! An iterator splits an ordered collection into fixed-size pages. A content
//! whose slug contains `{{iteratorName}}` is a template: it is never rendered
//! itself but stands in for one synthesized page per chunk.
//!
//! ```text
//! template slug  blog/page/{{post.pagination}}     title  "Posts ({{number}}/{{total}})"
//!                         │
//!     5 items, limit 2    ├── blog/page/1   "Posts (1/3)"   items[0..2]
//!                         ├── blog/page/2   "Posts (2/3)"   items[2..4]
//!                         └── blog/page/3   "Posts (3/3)"   items[4..5]
//! ```

use crate::{
    content::{Content, ContentStore, IteratorInfo, PageLink},
    error::Warning,
    query,
    schema::{IteratorConfig, RenderPipeline, TypedValue, ValueMap},
    utils::{
        placeholder::{contains_placeholder, render},
        date::DateLocale,
        slug::permalink,
    },
};

/// Placeholder replaced by the 1-based page number.
const TOKEN_NUMBER: &str = "number";
/// Placeholder replaced by the page count.
const TOKEN_TOTAL: &str = "total";

/// The iterator a content is a template for, if any.
pub fn template_of<'a>(
    content: &Content,
    pipeline: &'a RenderPipeline,
) -> Option<(&'a str, &'a IteratorConfig)> {
    pipeline
        .iterators
        .iter()
        .find(|(name, _)| contains_placeholder(&content.slug, name))
        .map(|(name, config)| (name.as_str(), config))
}

/// Run an iterator's query and paginate the result for `template`.
pub fn expand(
    template: &Content,
    name: &str,
    config: &IteratorConfig,
    store: &ContentStore,
    locale: &DateLocale,
    base_url: &str,
) -> Result<Vec<Content>, Warning> {
    let items = query::run(&config.query(), &template.query_fields(), store, locale)?
        .into_iter()
        .cloned()
        .collect();
    Ok(paginate(template, name, config.limit, items, base_url))
}

/// Split `items` into pages of `limit`, one synthesized content per page.
///
/// Always yields at least one page. A zero `limit` is treated as one.
/// Page ids substitute the same tokens as slugs; an id without any gets
/// `/<number>` appended so pages stay distinct.
pub fn paginate(
    template: &Content,
    name: &str,
    limit: usize,
    items: Vec<Content>,
    base_url: &str,
) -> Vec<Content> {
    let limit = limit.max(1);
    let total = items.len().div_ceil(limit).max(1);

    let slugs: Vec<String> = (1..=total)
        .map(|number| substitute(&template.slug, name, number, total))
        .collect();

    let mut chunks = items.into_iter();
    slugs
        .iter()
        .enumerate()
        .map(|(index, slug)| {
            let number = index + 1;
            let links = slugs
                .iter()
                .enumerate()
                .map(|(i, s)| PageLink {
                    number: i + 1,
                    permalink: permalink(base_url, s),
                    is_current: i + 1 == number,
                })
                .collect();

            let mut page = template.clone();
            page.id = page_id(&template.id, name, number, total);
            page.slug = slug.clone();
            substitute_values(&mut page.properties, name, number, total);
            substitute_values(&mut page.user_defined, name, number, total);
            page.iterator = Some(IteratorInfo {
                current: number,
                total,
                limit,
                items: chunks.by_ref().take(limit).collect(),
                links,
            });
            page
        })
        .collect()
}

fn page_id(id: &str, name: &str, number: usize, total: usize) -> String {
    let substituted = substitute(id, name, number, total);
    if substituted == id {
        format!("{id}/{number}")
    } else {
        substituted
    }
}

fn substitute(template: &str, name: &str, number: usize, total: usize) -> String {
    render(template, |token| match token {
        t if t == name || t == TOKEN_NUMBER => Some(number.to_string()),
        TOKEN_TOTAL => Some(total.to_string()),
        _ => None,
    })
    .into_owned()
}

fn substitute_values(values: &mut ValueMap, name: &str, number: usize, total: usize) {
    fn walk(value: &mut TypedValue, name: &str, number: usize, total: usize) {
        match value {
            TypedValue::String(s) => *s = substitute(s, name, number, total),
            TypedValue::Array(items) => {
                items.iter_mut().for_each(|v| walk(v, name, number, total));
            }
            TypedValue::Map(map) => substitute_values(map, name, number, total),
            _ => {}
        }
    }
    values
        .values_mut()
        .for_each(|v| walk(v, name, number, total));
}
