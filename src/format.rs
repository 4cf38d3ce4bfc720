//! Output formats for the nimbus CLI.
//!
//! Structured formats (JSON and YAML) are produced from any `Serialize` value.
//! The human formats (`none` and `pretty`) are rendered by each command.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

pub const NONE: &str = "none";
pub const JSON: &str = "json";
pub const YAML: &str = "yaml";
pub const PRETTY: &str = "pretty";

const YAML_INDENT: usize = 2;

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    /// Error when an unsupported output format is requested
    #[error("invalid output format {0}")]
    UnsupportedOutputFormat(String),

    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerializationError(#[from] serde_yaml::Error),
}

/// Enum representing the supported output formats
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable tables and status lines
    #[default]
    None,
    /// 2-space indented JSON
    Json,
    /// YAML with indented sequences
    Yaml,
    /// Human readable output with boxed tables
    Pretty,
}

impl OutputFormat {
    /// Returns a vector of all supported format names as strings
    pub fn names() -> Vec<&'static str> {
        OutputFormat::iter().map(|format| format.as_str()).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::None => NONE,
            OutputFormat::Json => JSON,
            OutputFormat::Yaml => YAML,
            OutputFormat::Pretty => PRETTY,
        }
    }

    /// True for the formats that emit a single machine-readable document.
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FormattingError;

    fn from_str(format_str: &str) -> Result<OutputFormat, FormattingError> {
        let normalized = format_str.trim().to_lowercase();
        OutputFormat::iter()
            .find(|format| format.as_str() == normalized)
            .ok_or(FormattingError::UnsupportedOutputFormat(normalized))
    }
}

/// Serialize `value` as 2-space indented JSON followed by a newline.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, FormattingError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Serialize `value` as YAML with sequences indented under their parent key.
///
/// The value goes through its JSON representation first, so types that only
/// define a JSON shape (timestamps, UUIDs, flattened models) render the same way
/// in both formats.
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String, FormattingError> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    emit_yaml(&value, 0, &mut out)?;
    Ok(out)
}

fn emit_yaml(value: &Value, indent: usize, out: &mut String) -> Result<(), FormattingError> {
    let pad = " ".repeat(indent);
    match value {
        Value::Object(map) if map.is_empty() => {
            out.push_str(&pad);
            out.push_str("{}\n");
        }
        Value::Array(items) if items.is_empty() => {
            out.push_str(&pad);
            out.push_str("[]\n");
        }
        Value::Object(map) => {
            for (key, child) in map {
                out.push_str(&pad);
                out.push_str(&yaml_string(key)?);
                out.push(':');
                match child {
                    Value::Object(m) if !m.is_empty() => {
                        out.push('\n');
                        emit_yaml(child, indent + YAML_INDENT, out)?;
                    }
                    Value::Array(a) if !a.is_empty() => {
                        out.push('\n');
                        emit_yaml(child, indent + YAML_INDENT, out)?;
                    }
                    Value::Object(_) => out.push_str(" {}\n"),
                    Value::Array(_) => out.push_str(" []\n"),
                    scalar => {
                        out.push(' ');
                        out.push_str(&yaml_scalar(scalar)?);
                        out.push('\n');
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(m) if !m.is_empty() => sequence_entry(item, indent, out)?,
                    Value::Array(a) if !a.is_empty() => sequence_entry(item, indent, out)?,
                    Value::Object(_) => {
                        out.push_str(&pad);
                        out.push_str("- {}\n");
                    }
                    Value::Array(_) => {
                        out.push_str(&pad);
                        out.push_str("- []\n");
                    }
                    scalar => {
                        out.push_str(&pad);
                        out.push_str("- ");
                        out.push_str(&yaml_scalar(scalar)?);
                        out.push('\n');
                    }
                }
            }
        }
        scalar => {
            out.push_str(&pad);
            out.push_str(&yaml_scalar(scalar)?);
            out.push('\n');
        }
    }
    Ok(())
}

// A collection inside a sequence starts on the dash line: the nested block is
// emitted one level deeper and its first indentation is replaced by "- ".
fn sequence_entry(item: &Value, indent: usize, out: &mut String) -> Result<(), FormattingError> {
    let mut nested = String::new();
    emit_yaml(item, indent + YAML_INDENT, &mut nested)?;
    out.push_str(&" ".repeat(indent));
    out.push_str("- ");
    out.push_str(&nested[indent + YAML_INDENT..]);
    Ok(())
}

fn yaml_scalar(value: &Value) -> Result<String, FormattingError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => yaml_string(s),
        collection => Ok(serde_json::to_string(collection)?),
    }
}

fn yaml_string(s: &str) -> Result<String, FormattingError> {
    if s.contains('\n') {
        // Double-quoted JSON strings are valid YAML and keep line breaks on one line.
        return Ok(serde_json::to_string(s)?);
    }
    Ok(serde_yaml::to_string(s)?.trim_end_matches('\n').to_string())
}
