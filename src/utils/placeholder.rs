//! `{{name}}` placeholder substitution.
//!
//! Used for output path templates, iterator slug patterns, page titles and
//! query parameter references.

use regex::{Captures, Regex};
use std::{borrow::Cow, sync::LazyLock};

/// ASCII-only: the regex crate is built without Unicode classes.
const PATTERN: &str = r"\{\{[ \t]*([A-Za-z0-9_.\-]+)[ \t]*\}\}";

static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(PATTERN).unwrap());

/// Name of the placeholder if `s` is exactly one `{{name}}` token.
pub fn placeholder_name(s: &str) -> Option<&str> {
    let caps = RE_PLACEHOLDER.captures(s.trim())?;
    let whole = caps.get(0)?;
    (whole.len() == s.trim().len()).then(|| caps.get(1).map(|m| m.as_str()))?
}

/// Whether `s` contains the `{{name}}` token.
pub fn contains_placeholder(s: &str, name: &str) -> bool {
    RE_PLACEHOLDER
        .captures_iter(s)
        .any(|caps| &caps[1] == name)
}

/// Replace every `{{name}}` for which `lookup` returns a value.
///
/// Unknown placeholders are left untouched.
pub fn render<'a, F>(template: &'a str, lookup: F) -> Cow<'a, str>
where
    F: Fn(&str) -> Option<String>,
{
    RE_PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_compiles() {
        assert!(Regex::new(PATTERN).is_ok());
        assert!(RE_PLACEHOLDER.is_match("{{ slug\t}}"));
    }

    #[test]
    fn test_placeholder_name_exact() {
        assert_eq!(placeholder_name("{{authors}}"), Some("authors"));
        assert_eq!(placeholder_name("{{ post.pagination }}"), Some("post.pagination"));
        assert_eq!(placeholder_name("by {{authors}}"), None);
        assert_eq!(placeholder_name("{{a}}{{b}}"), None);
        assert_eq!(placeholder_name("authors"), None);
    }

    #[test]
    fn test_contains_placeholder() {
        assert!(contains_placeholder("blog/page/{{post.pagination}}", "post.pagination"));
        assert!(!contains_placeholder("blog/page/{{number}}", "post.pagination"));
    }

    #[test]
    fn test_render_known_and_unknown() {
        let out = render("{{slug}}/{{lang}}/x", |name| {
            (name == "slug").then(|| "blog/hello".to_owned())
        });
        assert_eq!(out, "blog/hello/{{lang}}/x");
    }

    #[test]
    fn test_render_no_placeholders_borrows() {
        let out = render("plain", |_| None);
        assert!(matches!(out, Cow::Borrowed("plain")));
    }
}
