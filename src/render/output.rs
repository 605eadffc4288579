//! Output destination paths.
//!
//! `render(output.path)/output.file.output.ext`, where the path template may
//! use `{{slug}}`, `{{id}}` and `{{contentType}}`.

use crate::{content::Content, schema::OutputConfig, utils::placeholder::render};
use std::path::PathBuf;

/// Destination of a content's artifact, relative to the output directory.
pub fn destination(output: &OutputConfig, content: &Content) -> PathBuf {
    let lookup = |token: &str| match token {
        "slug" => Some(content.slug.clone()),
        "id" => Some(content.id.clone()),
        "contentType" => Some(content.content_type.clone()),
        _ => None,
    };
    let directory = render(&output.path, lookup);
    let file = format!(
        "{}.{}",
        render(&output.file, lookup),
        render(&output.ext, lookup)
    );

    let mut path: PathBuf = directory
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();
    path.push(file);
    path
}
