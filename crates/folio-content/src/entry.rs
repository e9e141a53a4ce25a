//! Parsed content entries.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// One parsed content file.
///
/// The data is immutable once loaded. Request handling works on a deep copy
/// obtained from [`ContentEntry::to_payload`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    source: PathBuf,
    data: Value,
}

impl ContentEntry {
    /// Create an entry from its source file and parsed data.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, data: Value) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }

    /// File this entry was parsed from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Parsed data.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Root template declared in `settings.template`, if any.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.data
            .pointer("/settings/template")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Typed view of the `settings` block.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.data
            .get("settings")
            .map(Settings::from_value)
            .unwrap_or_default()
    }

    /// Request-scoped deep copy of the data.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        self.data.clone()
    }
}

/// Rendering directives from a content entry's `settings` block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root partial rendered for the page.
    pub template: Option<String>,
    /// Display title (used by navigation).
    pub title: Option<String>,
    /// Navigation ordering index.
    pub index: Option<i64>,
}

impl Settings {
    /// Read settings from a `settings` value.
    ///
    /// Numbers written as strings are accepted for `index`, since the text
    /// format stores every value as a string.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let string = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        let index = value.get("index").and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Self {
            template: string("template"),
            title: string("title"),
            index,
        }
    }
}
