//! External body transformers.
//!
//! A pipeline lists transformer names per content type; each name resolves
//! to a `[transformers.<name>]` command in `site.toml`. Transformers run in
//! order, each receiving the previous one's output.
//!
//! # Execution
//!
//! ```text
//! body ──► NamedTempFile ──► command {{file}} ──► read back ──► next transformer
//!               │
//!               └── removed on drop, success or failure
//! ```
//!
//! A failing transformer is logged and skipped: its input passes through
//! unchanged to the next one.

use crate::{
    config::TransformerConfig,
    error::Warning,
    utils::placeholder::{contains_placeholder, render},
};
use anyhow::{Context, Result, bail};
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::Path,
    process::{Command, Output},
};

/// Placeholder replaced by the temporary file path.
const TOKEN_FILE: &str = "file";

/// Run the named transformers over `body` for `content`.
///
/// Returns the transformed body and one warning per failed transformer.
pub fn apply(
    names: &[String],
    registry: &BTreeMap<String, TransformerConfig>,
    content: &str,
    body: &str,
) -> (String, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut current = body.to_owned();

    for name in names {
        let result = registry
            .get(name)
            .with_context(|| format!("transformer `{name}` is not configured"))
            .and_then(|transformer| run(&transformer.command, &current));

        match result {
            Ok(output) => current = output,
            Err(source) => warnings.push(
                Warning::TransformFailed {
                    content: content.to_owned(),
                    transformer: name.clone(),
                    source,
                }
                .emit(),
            ),
        }
    }
    (current, warnings)
}

/// Run one command over `input` through a temporary file.
pub fn run(command: &[String], input: &str) -> Result<String> {
    let (program, args) = command.split_first().context("Empty command")?;
    let program = shellexpand::tilde(program);
    let executable = which::which(&*program)
        .with_context(|| format!("`{program}` not found. Please install it first."))?;

    let mut file = tempfile::Builder::new()
        .prefix("toucan-")
        .suffix(".tmp")
        .tempfile()
        .context("Failed to create temporary file")?;
    file.write_all(input.as_bytes())
        .and_then(|()| file.flush())
        .context("Failed to write temporary file")?;

    let output = prepare(&executable, args, file.path())
        .output()
        .with_context(|| format!("Failed to execute `{program}`"))?;
    if !output.status.success() {
        bail!(format_error(&program, &output));
    }

    fs::read_to_string(file.path()).context("Failed to read transformed file")
}

/// Build the command, substituting `{{file}}` or appending the path.
fn prepare(executable: &Path, args: &[String], file: &Path) -> Command {
    let path = file.to_string_lossy();
    let mut command = Command::new(executable);
    let mut mentions_file = false;

    for arg in args {
        if contains_placeholder(arg, TOKEN_FILE) {
            mentions_file = true;
            command.arg(&*render(arg, |token| {
                (token == TOKEN_FILE).then(|| path.to_string())
            }));
        } else {
            command.arg(&*shellexpand::tilde(arg));
        }
    }
    if !mentions_file {
        command.arg(file);
    }
    command
}

/// Format command error message.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut msg = format!("Command `{name}` failed with {}", output.status);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    fn registry() -> BTreeMap<String, TransformerConfig> {
        BTreeMap::from([
            (
                "upper".to_owned(),
                TransformerConfig {
                    command: shell(r#"tr a-z A-Z < "$0" > "$0.out" && mv "$0.out" "$0""#),
                },
            ),
            (
                "exclaim".to_owned(),
                TransformerConfig {
                    command: shell(r#"printf '!' >> "$0""#),
                },
            ),
            (
                "broken".to_owned(),
                TransformerConfig {
                    command: shell("echo boom >&2; exit 3"),
                },
            ),
        ])
    }

    #[test]
    fn test_run_edits_file_in_place() {
        let registry = registry();
        assert_eq!(run(&registry["upper"].command, "hello").unwrap(), "HELLO");
    }

    #[test]
    fn test_run_file_placeholder() {
        let command = vec![
            "sh".to_owned(),
            "-c".to_owned(),
            r#"printf 'x' > "$1""#.to_owned(),
            "sh".to_owned(),
            "{{file}}".to_owned(),
        ];
        assert_eq!(run(&command, "original").unwrap(), "x");
    }

    #[test]
    fn test_run_reports_failure() {
        let err = run(&registry()["broken"].command, "x").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("failed"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_run_missing_program() {
        let err = run(&["toucan-no-such-program".to_owned()], "x").unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(run(&[], "x").is_err());
    }

    #[test]
    fn test_apply_chains_and_passes_through_failures() {
        let names = ["upper", "broken", "missing", "exclaim"].map(String::from);
        let (body, warnings) = apply(&names, &registry(), "blog/a", "hi");

        assert_eq!(body, "HI!");
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| matches!(
            w,
            Warning::TransformFailed { content, .. } if content == "blog/a"
        )));
    }
}
