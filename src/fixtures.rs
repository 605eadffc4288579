//! Shared test builders.

use crate::{
    content::{Content, RawContent},
    schema::{TypedValue, ValueMap},
};
use std::{collections::BTreeMap, path::PathBuf};

/// A bare content of `content_type` whose slug equals its id.
pub fn content(content_type: &str, id: &str) -> Content {
    Content {
        id: id.to_owned(),
        content_type: content_type.to_owned(),
        slug: id.to_owned(),
        origin_path: PathBuf::from(format!("{id}.md")),
        last_modified: 0.0,
        raw_front_matter: ValueMap::new(),
        body: String::new(),
        properties: ValueMap::new(),
        relations: BTreeMap::new(),
        user_defined: ValueMap::new(),
        iterator: None,
    }
}

/// A raw source with the given front matter and an empty body.
pub fn raw(id: &str, front_matter: &[(&str, TypedValue)]) -> RawContent {
    RawContent {
        id: id.to_owned(),
        origin_path: PathBuf::from(format!("{id}.md")),
        last_modified: 0.0,
        front_matter: front_matter
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
        body: String::new(),
    }
}

/// A content with the given declared properties.
pub fn with_properties(
    content_type: &str,
    id: &str,
    properties: &[(&str, TypedValue)],
) -> Content {
    let mut c = content(content_type, id);
    c.properties = properties
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect();
    c
}
