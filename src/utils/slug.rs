//! URL slugification.
//!
//! Converts content ids and headings to URL-safe slugs.

use super::placeholder::placeholder_name;
use deunicode::deunicode;

/// Convert text to a lowercase ASCII slug.
///
/// Non-ASCII text is transliterated first (e.g. "Ünïcödé" → "unicode");
/// runs of any other character collapse into a single `-`.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '_' || c == '.' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Derive the default slug of a content id.
///
/// Each path segment is slugified; a trailing `index` segment is dropped so
/// `blog/index` becomes `blog` and the root `index` becomes the empty slug.
/// A segment that is exactly one `{{name}}` token is kept verbatim.
pub fn slugify_id(id: &str) -> String {
    let mut segments: Vec<_> = id
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match placeholder_name(s) {
            Some(_) => s.to_owned(),
            None => slugify(s),
        })
        .filter(|s| !s.is_empty())
        .collect();
    if segments.last().is_some_and(|s| s == "index") {
        segments.pop();
    }
    segments.join("/")
}

/// Absolute URL of a slug below `base_url`, with a trailing slash.
///
/// The empty slug is the site root.
pub fn permalink(base_url: &str, slug: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{slug}/")
    }
}
