//! Content file formats.
//!
//! Two formats are supported:
//!
//! - **YAML** (`.yaml`, `.yml`): the document must be a mapping.
//! - **Delimited text** (`.txt`, `.content`): fields separated by lines of
//!   three or more dashes, each field written as `key: value`.
//!
//! ```text
//! title: Welcome
//! ----
//! settings.template: page
//! ----
//! text|markdown: Some *markdown*
//! spanning lines.
//! ```

use std::path::Path;

use serde_json::{Map, Value};

use crate::ContentError;
use crate::pipes::apply_pipe;

/// Format of a content file, derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentFormat {
    /// YAML mapping.
    Yaml,
    /// Dash-delimited `key: value` fields.
    Text,
}

impl ContentFormat {
    /// Detect the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "txt" | "content" => Some(Self::Text),
            _ => None,
        }
    }

    /// Parse file content in this format.
    ///
    /// `path` is only used for error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or not a mapping.
    pub fn parse(self, source: &str, path: &Path) -> Result<Value, ContentError> {
        match self {
            Self::Yaml => parse_yaml(source, path),
            Self::Text => parse_text(source, path),
        }
    }
}

/// Parse a YAML document into a mapping. Empty documents yield `{}`.
pub(crate) fn parse_yaml(source: &str, path: &Path) -> Result<Value, ContentError> {
    if source.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_yaml::from_str(source).map_err(|source| ContentError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(ContentError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Whether a line separates two text fields.
fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'-')
}

/// Parse the delimited text format.
pub(crate) fn parse_text(source: &str, path: &Path) -> Result<Value, ContentError> {
    let mut data = Map::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_start = 1;

    for (idx, line) in source.lines().enumerate() {
        if is_separator(line) {
            parse_field(&block, block_start, path, &mut data)?;
            block.clear();
            block_start = idx + 2;
        } else {
            block.push(line);
        }
    }
    parse_field(&block, block_start, path, &mut data)?;

    Ok(Value::Object(data))
}

/// Parse one `key: value` block into `data`.
fn parse_field(
    lines: &[&str],
    start_line: usize,
    path: &Path,
    data: &mut Map<String, Value>,
) -> Result<(), ContentError> {
    let joined = lines.join("\n");
    let text = joined.trim();
    if text.is_empty() {
        return Ok(());
    }
    // Leading blank lines shift where the key actually sits
    let line = start_line + lines.iter().take_while(|l| l.trim().is_empty()).count();
    let parse_error = |message: String| ContentError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let (raw_key, raw_value) = split_field(text)
        .ok_or_else(|| parse_error("expected `key: value`".to_owned()))?;

    let mut parts = raw_key.split('|').map(str::trim);
    let key = parts.next().unwrap_or_default();
    if key.is_empty() {
        return Err(parse_error("empty key".to_owned()));
    }

    let mut value = raw_value.trim().to_owned();
    if value.is_empty() {
        return Ok(());
    }
    for pipe in parts {
        value = apply_pipe(pipe, &value).ok_or_else(|| ContentError::UnknownPipe {
            path: path.to_path_buf(),
            key: key.to_owned(),
            pipe: pipe.to_owned(),
        })?;
    }

    insert_dotted(data, key, Value::String(value)).map_err(parse_error)
}

/// Split a field at the first `": "`, or at a `:` ending the first line.
fn split_field(text: &str) -> Option<(&str, &str)> {
    let first_line = text.lines().next().unwrap_or_default();
    if let Some(idx) = first_line.find(": ") {
        return Some((&text[..idx], &text[idx + 2..]));
    }
    let key = first_line.strip_suffix(':')?;
    Some((key, &text[first_line.len()..]))
}

/// Insert `value` at a dotted key path, creating nested mappings.
fn insert_dotted(data: &mut Map<String, Value>, key: &str, value: Value) -> Result<(), String> {
    let mut segments: Vec<&str> = key.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(format!("invalid key `{key}`"));
    }
    let last = segments.pop().unwrap_or(key);

    let mut current = data;
    for segment in segments {
        let slot = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            _ => return Err(format!("key `{key}` conflicts with the value of `{segment}`")),
        };
    }
    current.insert(last.to_owned(), value);
    Ok(())
}
