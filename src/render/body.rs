//! Rendered body handles.
//!
//! Markdown → HTML conversion lives outside this crate. A [`ContentRenderer`]
//! turns a (possibly transformed) body into the opaque handle exposed as
//! `body` in a context; [`PassThrough`] is the built-in renderer.

use crate::{content::Content, utils::slug::slugify};
use serde::Serialize;

/// Words read per minute used for `readingTime`.
const WORDS_PER_MINUTE: usize = 238;

/// One heading of the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Anchor id derived from the text
    pub fragment: String,
}

/// The `body` sub-context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBody {
    pub html: String,
    /// Minutes, at least 1
    pub reading_time: usize,
    pub outline: Vec<Heading>,
}

/// Body renderer collaborator.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, content: &Content, body: &str) -> RenderedBody;
}

/// Keeps the body text as its HTML.
///
/// Reading time counts whitespace-separated words; the outline lists ATX
/// (`#`) headings outside fenced code blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ContentRenderer for PassThrough {
    fn render(&self, _content: &Content, body: &str) -> RenderedBody {
        RenderedBody {
            html: body.to_owned(),
            reading_time: reading_time(body),
            outline: outline(body),
        }
    }
}

pub fn reading_time(text: &str) -> usize {
    text.split_whitespace().count().div_ceil(WORDS_PER_MINUTE).max(1)
}

pub fn outline(text: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
        if !(1..=6).contains(&hashes) {
            continue;
        }
        let rest = &trimmed[hashes..];
        if !rest.is_empty() && !rest.starts_with(' ') {
            continue;
        }
        let text = rest.trim().trim_end_matches('#').trim_end().to_owned();
        if text.is_empty() {
            continue;
        }

        #[allow(clippy::cast_possible_truncation)]
        let level = hashes as u8;
        headings.push(Heading {
            level,
            fragment: slugify(&text),
            text,
        });
    }
    headings
}
