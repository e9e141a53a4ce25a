//! Route table construction by filesystem walking.
//!
//! The directory structure under the content root mirrors the URL structure:
//!
//! - `index.yaml` -> `/`
//! - `about.yaml` -> `/about`
//! - `blog/index.txt` -> `/blog`
//! - `blog/post1.yaml` -> `/blog/post1`
//!
//! Entries are enumerated in lexical file-name order, so when two files map
//! to the same path the later one wins deterministically.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::format::parse_yaml;
use crate::{ContentEntry, ContentError, ContentFormat};

/// Default name of the reserved global content folder.
const DEFAULT_GLOBAL_DIR: &str = "_global";

/// Default name of the route alias file.
const DEFAULT_ROUTES_FILE: &str = "_routes.yaml";

/// Two content files resolved to the same route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCollision {
    /// Route path both files map to.
    pub path: String,
    /// File whose content is served.
    pub kept: PathBuf,
    /// File whose content was replaced.
    pub replaced: PathBuf,
}

/// Immutable mapping from URL path to content.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: BTreeMap<String, ContentEntry>,
    aliases: BTreeSet<String>,
    collisions: Vec<RouteCollision>,
}

impl RouteTable {
    /// Look up the entry served at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ContentEntry> {
        self.entries.get(path)
    }

    /// All route paths in lexical order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All routes with their entries in lexical path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentEntry)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Routes derived from a content file's location, without aliases.
    pub fn canonical(&self) -> impl Iterator<Item = (&str, &ContentEntry)> {
        self.iter().filter(move |(path, _)| !self.is_alias(path))
    }

    /// Whether `path` was registered from the alias file.
    #[must_use]
    pub fn is_alias(&self, path: &str) -> bool {
        self.aliases.contains(path)
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collisions observed while building.
    #[must_use]
    pub fn collisions(&self) -> &[RouteCollision] {
        &self.collisions
    }

    fn insert(
        &mut self,
        path: String,
        entry: ContentEntry,
        strict: bool,
    ) -> Result<(), ContentError> {
        if !is_registrable(&path) {
            return Err(ContentError::InvalidRoutePath {
                route: path,
                file: entry.source().to_path_buf(),
            });
        }

        let kept = entry.source().to_path_buf();
        if let Some(previous) = self.entries.insert(path.clone(), entry) {
            let replaced = previous.source().to_path_buf();
            if strict {
                return Err(ContentError::RouteCollision {
                    route: path,
                    kept,
                    replaced,
                });
            }
            tracing::warn!(
                route = %path,
                kept = %kept.display(),
                replaced = %replaced.display(),
                "Route collision, later file wins"
            );
            self.collisions.push(RouteCollision {
                path,
                kept,
                replaced,
            });
        }
        Ok(())
    }
}

/// Builds a [`RouteTable`] from a content directory.
pub struct RouteTableBuilder {
    root: PathBuf,
    global_dir: String,
    routes_file: String,
    strict: bool,
}

impl RouteTableBuilder {
    /// Create a builder for the given content root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_dir: DEFAULT_GLOBAL_DIR.to_owned(),
            routes_file: DEFAULT_ROUTES_FILE.to_owned(),
            strict: false,
        }
    }

    /// Name of the global folder skipped at the content root.
    #[must_use]
    pub fn global_dir(mut self, name: impl Into<String>) -> Self {
        self.global_dir = name.into();
        self
    }

    /// Name of the alias file read from the content root.
    #[must_use]
    pub fn routes_file(mut self, name: impl Into<String>) -> Self {
        self.routes_file = name.into();
        self
    }

    /// Fail on the first route collision instead of warning.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Walk the content root and build the route table.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing, a content file cannot be read
    /// or parsed, a route path is invalid, an alias is unknown, or (in strict
    /// mode) two files map to the same path.
    pub fn build(&self) -> Result<RouteTable, ContentError> {
        if !self.root.is_dir() {
            return Err(ContentError::RootNotFound(self.root.clone()));
        }

        let mut table = RouteTable::default();
        let mut by_key = HashMap::new();
        self.scan_directory(&self.root, "", "", &mut table, &mut by_key)?;

        let routes_path = self.root.join(&self.routes_file);
        if routes_path.is_file() {
            self.apply_aliases(&routes_path, &mut table, &by_key)?;
        }

        tracing::info!(
            root = %self.root.display(),
            routes = table.len(),
            collisions = table.collisions.len(),
            "Built route table"
        );
        Ok(table)
    }

    /// Scan one directory level.
    ///
    /// `url_prefix` is the URL path of the directory (empty at the root) and
    /// `key_prefix` its relative path, used to address entries from aliases.
    fn scan_directory(
        &self,
        dir: &Path,
        url_prefix: &str,
        key_prefix: &str,
        table: &mut RouteTable,
        by_key: &mut HashMap<String, ContentEntry>,
    ) -> Result<(), ContentError> {
        let mut entries: Vec<_> = fs::read_dir(dir)
            .map_err(|e| ContentError::io(dir, e))?
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.path().is_dir();
                (e.file_name().to_string_lossy().into_owned(), e.path(), is_dir)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let at_root = url_prefix.is_empty();
        for (name, path, is_dir) in entries {
            if name.starts_with('.') {
                continue;
            }
            if at_root && (name == self.global_dir || name == self.routes_file) {
                continue;
            }

            if is_dir {
                if loops_back(dir, &path) {
                    tracing::warn!(path = %path.display(), "Skipping symlink loop");
                    continue;
                }
                let child_url = format!("{url_prefix}/{name}");
                let child_key = join_key(key_prefix, &name);
                self.scan_directory(&path, &child_url, &child_key, table, by_key)?;
                continue;
            }

            let Some(format) = ContentFormat::from_path(&path) else {
                tracing::debug!(path = %path.display(), "Skipping non-content file");
                continue;
            };
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            let source = fs::read_to_string(&path).map_err(|e| ContentError::io(&path, e))?;
            let data = format.parse(&source, &path)?;
            let entry = ContentEntry::new(path, data);

            by_key.insert(join_key(key_prefix, &stem), entry.clone());
            table.insert(route_path(url_prefix, &stem), entry, self.strict)?;
        }
        Ok(())
    }

    /// Register the extra paths listed in the alias file.
    fn apply_aliases(
        &self,
        routes_path: &Path,
        table: &mut RouteTable,
        by_key: &HashMap<String, ContentEntry>,
    ) -> Result<(), ContentError> {
        let source =
            fs::read_to_string(routes_path).map_err(|e| ContentError::io(routes_path, e))?;
        let Value::Object(aliases) = parse_yaml(&source, routes_path)? else {
            return Err(ContentError::NotAMapping {
                path: routes_path.to_path_buf(),
            });
        };

        for (route, target) in aliases {
            let target = match target {
                Value::String(s) => s,
                other => other.to_string(),
            };
            let key = target.trim_matches('/');
            let entry = by_key
                .get(key)
                .ok_or_else(|| ContentError::UnknownAlias {
                    route: route.clone(),
                    target: target.clone(),
                })?;

            let path = normalize_route(&route);
            tracing::debug!(route = %path, target = %key, "Registered route alias");
            table.insert(path.clone(), entry.clone(), self.strict)?;
            table.aliases.insert(path);
        }
        Ok(())
    }
}

/// URL path for a file stem inside a directory with URL path `prefix`.
fn route_path(prefix: &str, stem: &str) -> String {
    match (prefix.is_empty(), stem == "index") {
        (true, true) => "/".to_owned(),
        (false, true) => prefix.to_owned(),
        (_, false) => format!("{prefix}/{stem}"),
    }
}

/// Whether `path` can be registered as an exact HTTP route.
///
/// Requests are matched on the raw, percent-encoded path, so every segment
/// must consist of characters that never need encoding. Segments starting
/// with `:` or `*` are reserved by the router.
fn is_registrable(path: &str) -> bool {
    path.split('/').all(|segment| {
        !segment.starts_with([':', '*']) && segment.chars().all(is_path_char)
    })
}

/// RFC 3986 `pchar` without percent-encoding.
fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~!$&'()+,;=:@".contains(c)
}

/// Whether descending into `child` would revisit `dir` or one of its
/// ancestors through a symlink.
fn loops_back(dir: &Path, child: &Path) -> bool {
    match (fs::canonicalize(dir), fs::canonicalize(child)) {
        (Ok(dir), Ok(child)) => dir.starts_with(child),
        _ => false,
    }
}

fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Ensure an alias path starts with `/` and has no trailing slash.
fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_matches('/');
    format!("/{trimmed}")
}
