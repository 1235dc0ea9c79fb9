//! Output formatting for command responses

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// Human-readable summary
    Human,
    /// Plain text; `render` prints bare HTML
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: json, human, text",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Envelope every command returns
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub operation: &'static str,
    pub success: bool,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub took_ms: u64,
}

impl CommandResponse {
    pub fn ok(operation: &'static str, data: Value) -> Self {
        Self {
            operation,
            success: true,
            data,
            count: None,
            warnings: Vec::new(),
            took_ms: 0,
        }
    }

    pub fn failed(operation: &'static str, data: Value, warning: impl Into<String>) -> Self {
        Self {
            success: false,
            warnings: vec![warning.into()],
            ..Self::ok(operation, data)
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_took_ms(mut self, took_ms: u64) -> Self {
        self.took_ms = took_ms;
        self
    }

    pub fn render(&self, format: OutputFormat) -> String {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        ResponseFormatter::format(&value, format)
    }
}

/// Formatter for converting responses to different formats
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn format(response: &Value, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(response),
            OutputFormat::Human => Self::format_human(response),
            OutputFormat::Text => Self::format_text(response),
        }
    }

    fn format_json(response: &Value) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string())
    }

    fn format_human(response: &Value) -> String {
        let mut output = String::new();

        if let Some(obj) = response.as_object() {
            if let Some(op) = obj.get("operation").and_then(|v| v.as_str()) {
                output.push_str(&format!("⚙️  Operation: {}\n", op));
            }

            if let Some(success) = obj.get("success").and_then(|v| v.as_bool()) {
                let status = if success { "✅ Success" } else { "❌ Failed" };
                output.push_str(&format!("Status: {}\n", status));
            }

            output.push('\n');

            if let Some(data) = obj.get("data")
                && !data.is_null()
            {
                output.push_str("📊 Data:\n");
                output.push_str(&Self::format_value_indented(data, 2));
            }

            if let Some(warnings) = obj.get("warnings").and_then(|v| v.as_array())
                && !warnings.is_empty()
            {
                output.push_str("\n⚠️  Warnings:\n");
                for warning in warnings.iter().filter_map(|w| w.as_str()) {
                    output.push_str(&format!("  • {}\n", warning));
                }
            }

            if let Some(count) = obj.get("count").and_then(|v| v.as_u64()) {
                output.push_str(&format!("Count: {}\n", count));
            }

            if let Some(took) = obj.get("took_ms").and_then(|v| v.as_u64()) {
                output.push_str(&format!("\n⏱️  Took: {}ms\n", took));
            }
        }

        if output.is_empty() {
            Self::format_json(response)
        } else {
            output
        }
    }

    /// Just the payload: strings verbatim, one line per array item
    fn format_text(response: &Value) -> String {
        let Some(data) = response.get("data") else {
            return Self::format_json(response);
        };

        let mut output = match data {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(Self::text_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Value::Null => String::new(),
            other => Self::format_value_indented(other, 0),
        };

        if let Some(warnings) = response.get("warnings").and_then(|v| v.as_array()) {
            for warning in warnings.iter().filter_map(|w| w.as_str()) {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&format!("✗ {}", warning));
            }
        }

        if !output.ends_with('\n') {
            output.push('\n');
        }
        output
    }

    /// One-line form of a list item: its slug, path or name when it has one
    fn text_line(item: &Value) -> String {
        ["slug", "path", "name"]
            .iter()
            .find_map(|key| item.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    fn format_value_indented(value: &Value, indent: usize) -> String {
        let indent_str = " ".repeat(indent);

        match value {
            Value::Object(map) => {
                let mut result = String::new();
                for (key, val) in map.iter() {
                    result.push_str(&format!("{}{}: ", indent_str, key));
                    match val {
                        Value::String(s) => result.push_str(&format!("{}\n", s)),
                        Value::Number(n) => result.push_str(&format!("{}\n", n)),
                        Value::Bool(b) => result.push_str(&format!("{}\n", b)),
                        Value::Array(arr) => {
                            result.push_str(&format!("[{} items]\n", arr.len()));
                            for (i, item) in arr.iter().take(3).enumerate() {
                                result.push_str(&format!(
                                    "{}  [{}] {}\n",
                                    indent_str,
                                    i,
                                    Self::text_line(item)
                                ));
                            }
                            if arr.len() > 3 {
                                result.push_str(&format!(
                                    "{}  ... and {} more\n",
                                    indent_str,
                                    arr.len() - 3
                                ));
                            }
                        }
                        Value::Object(_) => {
                            result.push('\n');
                            result.push_str(&Self::format_value_indented(val, indent + 2));
                        }
                        Value::Null => result.push_str("null\n"),
                    }
                }
                result
            }
            Value::Array(arr) => {
                let mut result = String::new();
                for (i, item) in arr.iter().take(10).enumerate() {
                    result.push_str(&format!("{}[{}] {}\n", indent_str, i, Self::text_line(item)));
                }
                if arr.len() > 10 {
                    result.push_str(&format!("{}... and {} more\n", indent_str, arr.len() - 10));
                }
                result
            }
            Value::String(s) => format!("{}{}\n", indent_str, s),
            other => format!("{}{}\n", indent_str, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("HUMAN").unwrap(), OutputFormat::Human);
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("yaml").is_err());
    }

    #[test]
    fn test_format_json() {
        let response = CommandResponse::ok("stats", json!({"scans": 1}));
        let formatted = response.render(OutputFormat::Json);
        assert!(formatted.contains("\"success\": true"));
        assert!(!formatted.contains("warnings"));
    }

    #[test]
    fn test_format_human() {
        let response = CommandResponse::ok("search", json!([{"slug": "a"}, {"slug": "b"}]))
            .with_count(2)
            .with_took_ms(42);
        let formatted = response.render(OutputFormat::Human);
        assert!(formatted.contains("Operation: search"));
        assert!(formatted.contains("✅ Success"));
        assert!(formatted.contains("[1] b"));
        assert!(formatted.contains("Count: 2"));
        assert!(formatted.contains("42ms"));
    }

    #[test]
    fn test_format_text_prints_payload_only() {
        let html = CommandResponse::ok("render", json!("<p>hi</p>"));
        assert_eq!(html.render(OutputFormat::Text), "<p>hi</p>\n");

        let list = CommandResponse::ok("notes", json!([{"slug": "a/b"}, {"slug": "c"}]));
        assert_eq!(list.render(OutputFormat::Text), "a/b\nc\n");

        let missing = CommandResponse::failed("show", Value::Null, "Note not found: x");
        assert_eq!(missing.render(OutputFormat::Text), "✗ Note not found: x\n");
    }
}
