//! Shared content available to every render.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::ContentError;
use crate::format::parse_yaml;

/// Load the global content folder as one mapping.
///
/// Every non-hidden file directly inside `dir` is read in lexical order, the
/// contents are joined with newlines and parsed as a single YAML document.
/// Each file contributes top-level keys, which must be unique across files.
///
/// A missing folder yields an empty mapping.
pub fn load_global(dir: &Path) -> Result<Value, ContentError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "No global content folder");
        return Ok(Value::Object(Map::new()));
    }

    let mut files: Vec<_> = fs::read_dir(dir)
        .map_err(|e| ContentError::io(dir, e))?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        .collect();
    files.sort();

    let mut combined = String::new();
    for file in &files {
        let source = fs::read_to_string(file).map_err(|e| ContentError::io(file, e))?;
        combined.push_str(&source);
        if !source.ends_with('\n') {
            combined.push('\n');
        }
    }

    let value = parse_yaml(&combined, dir)?;
    tracing::debug!(dir = %dir.display(), files = files.len(), "Loaded global content");
    Ok(value)
}
