//! Front-matter extraction: `---\nYAML\n---`

use regex::Regex;
use std::sync::LazyLock;
use vaultview_core::{Error, Frontmatter, Result};

/// Matches a leading YAML block. The body may be empty and the closing
/// fence may end the file without a trailing newline.
static FRONTMATTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A---[ \t]*\r?\n(?:([\s\S]*?)\r?\n)?---[ \t]*(?:\r?\n|\z)").unwrap()
});

/// Split a file into `(front-matter YAML, body)`.
///
/// Returns `None` for the YAML part when the file does not open with a
/// complete `---` block; the body is then the whole input.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    // A BOM would hide the opening fence
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    match FRONTMATTER_PATTERN.captures(content) {
        Some(caps) => {
            let yaml = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            (Some(yaml), &content[end..])
        }
        None => (None, content),
    }
}

/// Parse a YAML front-matter block into a key/value map.
///
/// An empty block yields an empty map. A block whose top level is not a
/// mapping (a bare list or scalar) is a parse error.
pub fn parse_frontmatter(yaml: &str) -> Result<Frontmatter> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::new());
    }

    match serde_yaml::from_str::<serde_json::Value>(yaml) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(serde_json::Value::Null) => Ok(Frontmatter::new()),
        Ok(other) => Err(Error::parse_error(format!(
            "front-matter must be a mapping, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(Error::parse_error(format!("invalid front-matter: {}", e))),
    }
}

/// Title from front-matter: a non-empty string, or a number/bool rendered as text
pub fn frontmatter_title(frontmatter: &Frontmatter) -> Option<String> {
    match frontmatter.get("title")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
