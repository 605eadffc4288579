//! Content source files: discovery and front-matter decoding.
//!
//! A source is UTF-8 text with an optional leading front-matter block:
//!
//! ```text
//! ---
//! title: Hello
//! tags: [rust, ssg]
//! ---
//! Body text...
//! ```

use crate::{
    error::BuildError,
    schema::{TypedValue, ValueMap},
};
use gray_matter::{Matter, Pod, engine::Engine};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};
use walkdir::WalkDir;

/// File extensions treated as content sources.
const CONTENT_EXTENSIONS: &[&str] = &["md", "markdown", "html"];

/// Front-matter block delimiter.
const DELIMITER: &str = "---";

/// A decoded source file, before schema conversion.
#[derive(Debug, Clone)]
pub struct RawContent {
    /// Relative path without extension, `/`-separated
    pub id: String,
    pub origin_path: PathBuf,
    pub last_modified: f64,
    pub front_matter: ValueMap,
    pub body: String,
}

/// Front-matter engine that hands the block back as text, decoded
/// afterwards with `serde_yaml`.
struct RawBlock;

impl Engine for RawBlock {
    fn parse(content: &str) -> Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_owned()))
    }
}

/// Split and decode a source into front matter and body.
///
/// Text without a leading `---` line, or whose block is never closed, has
/// an empty front matter. A block that decodes to something other than a
/// mapping is treated as empty.
pub fn parse_source(text: &str) -> Result<(ValueMap, String), serde_yaml::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if !has_closed_block(text) {
        return Ok((ValueMap::new(), text.to_owned()));
    }
    let Ok(parsed) = Matter::<RawBlock>::new().parse::<String>(text) else {
        return Ok((ValueMap::new(), text.to_owned()));
    };

    let front_matter = match parsed.data.filter(|block| !block.trim().is_empty()) {
        Some(block) => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&block)?;
            match TypedValue::from_yaml(yaml) {
                Some(TypedValue::Map(map)) => map,
                _ => ValueMap::new(),
            }
        }
        None => ValueMap::new(),
    };
    Ok((front_matter, parsed.content))
}

/// Whether `text` opens with a `---` line that a later `---` line closes.
fn has_closed_block(text: &str) -> bool {
    let mut lines = text.lines().map(str::trim_end);
    lines.next() == Some(DELIMITER) && lines.any(|line| line == DELIMITER)
}

/// Discover and decode every content source below `root`.
///
/// Results are ordered by id.
pub fn load_all(root: &Path) -> Result<Vec<RawContent>, BuildError> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext))
        })
        .collect();
    paths.sort();

    let mut contents = paths
        .par_iter()
        .map(|path| load_one(root, path))
        .collect::<Result<Vec<_>, _>>()?;
    contents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(contents)
}

fn load_one(root: &Path, path: &Path) -> Result<RawContent, BuildError> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::Io(path.to_path_buf(), e))?;
    let (front_matter, body) =
        parse_source(&text).map_err(|e| BuildError::Decode(path.to_path_buf(), Box::new(e)))?;

    let last_modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0.0, |d| d.as_secs_f64());

    Ok(RawContent {
        id: content_id(root, path),
        origin_path: path.to_path_buf(),
        last_modified,
        front_matter,
        body,
    })
}

/// Relative path without extension, always `/`-separated.
fn content_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_source_with_front_matter() {
        let (fm, body) = parse_source("---\ntitle: Hello\ntags: [a, b]\n---\n\nBody\n").unwrap();
        assert_eq!(fm["title"], TypedValue::from("Hello"));
        assert_eq!(fm["tags"], TypedValue::from(vec!["a", "b"]));
        assert_eq!(body.trim(), "Body");
    }

    #[test]
    fn test_parse_source_without_front_matter() {
        let (fm, body) = parse_source("# Title\n---\ntext").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "# Title\n---\ntext");
    }

    #[test]
    fn test_parse_source_unterminated_block_is_body() {
        let (fm, body) = parse_source("---\ntitle: x\n").unwrap();
        assert!(fm.is_empty());
        assert!(body.contains("title: x"));
    }

    #[test]
    fn test_parse_source_empty_block() {
        let (fm, body) = parse_source("---\n---\nbody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body.trim(), "body");
    }

    #[test]
    fn test_parse_source_byte_order_mark() {
        let (fm, body) = parse_source("\u{feff}---\ntitle: Hi\n---\nbody\n").unwrap();
        assert_eq!(fm["title"], TypedValue::from("Hi"));
        assert_eq!(body.trim(), "body");
    }

    #[test]
    fn test_parse_source_scalar_block_is_empty() {
        let (fm, body) = parse_source("---\njust text\n---\nbody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body.trim(), "body");
    }

    #[test]
    fn test_parse_source_invalid_yaml() {
        assert!(parse_source("---\ntitle: [unclosed\n---\n").is_err());
    }

    #[test]
    fn test_load_all_ids() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("blog")).unwrap();
        fs::write(root.join("index.md"), "home").unwrap();
        fs::write(root.join("blog/hello.md"), "---\ntitle: Hi\n---\nx").unwrap();
        fs::write(root.join("blog/image.png"), "binary").unwrap();

        let contents = load_all(root).unwrap();
        let ids: Vec<_> = contents.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["blog/hello", "index"]);
        assert_eq!(contents[0].front_matter["title"], TypedValue::from("Hi"));
        assert!(contents[0].last_modified > 0.0);
    }

    #[test]
    fn test_load_all_reports_decode_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.md"), "---\n: : :\n  - [\n---\n").unwrap();
        let err = load_all(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::Decode(..)));
    }
}
