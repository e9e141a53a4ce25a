//! Module registry.
//!
//! A module is addressed by name and may have a template partial, a
//! controller, both, or neither. Partials are discovered on disk; controllers
//! are registered explicitly.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::builtin;
use crate::{Controller, ControllerError, ModuleError, RenderContext};

/// File extensions recognized as template partials.
const PARTIAL_EXTENSIONS: &[&str] = &["html", "jinja", "j2"];

/// A template partial discovered in the modules directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial {
    /// Template source.
    pub source: String,
    /// File the partial was read from (`None` for partials added in code).
    pub path: Option<PathBuf>,
}

/// Addressable table of partials and controllers keyed by module name.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    partials: BTreeMap<String, Partial>,
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut controllers: Vec<_> = self.controllers.keys().collect();
        controllers.sort();
        f.debug_struct("ModuleRegistry")
            .field("partials", &self.partials.keys().collect::<Vec<_>>())
            .field("controllers", &controllers)
            .finish()
    }
}

impl ModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in controllers registered.
    #[must_use]
    pub fn with_builtin_controllers() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Scan `root` recursively for partials.
    ///
    /// The module name is the file name up to its first `.`, so
    /// `navigation/navigation.html` registers the `navigation` partial.
    /// Returns the number of partials read.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or a file cannot be read.
    pub fn load(&mut self, root: &Path) -> Result<usize, ModuleError> {
        if !root.is_dir() {
            return Err(ModuleError::RootNotFound(root.to_path_buf()));
        }

        let mut count = 0;
        self.scan_directory(root, &mut count)?;
        tracing::info!(
            root = %root.display(),
            partials = count,
            "Loaded module partials"
        );
        Ok(count)
    }

    fn scan_directory(&mut self, dir: &Path, count: &mut usize) -> Result<(), ModuleError> {
        let io_error = |path: &Path, source| ModuleError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut entries: Vec<_> = fs::read_dir(dir)
            .map_err(|e| io_error(dir, e))?
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.path().is_dir();
                (e.file_name().to_string_lossy().into_owned(), e.path(), is_dir)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path, is_dir) in entries {
            if name.starts_with('.') {
                continue;
            }
            if is_dir {
                if loops_back(dir, &path) {
                    tracing::warn!(path = %path.display(), "Skipping symlink loop");
                    continue;
                }
                self.scan_directory(&path, count)?;
                continue;
            }
            let is_partial = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| PARTIAL_EXTENSIONS.contains(&e));
            if !is_partial {
                continue;
            }

            let module = module_name(&name);
            let source = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            if let Some(previous) = self.partials.get(module) {
                tracing::warn!(
                    module,
                    kept = %path.display(),
                    replaced = ?previous.path,
                    "Duplicate module partial, later file wins"
                );
            }
            self.partials.insert(
                module.to_owned(),
                Partial {
                    source,
                    path: Some(path),
                },
            );
            *count += 1;
        }
        Ok(())
    }

    /// Register a partial from a source string.
    pub fn register_partial(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.partials.insert(
            name.into(),
            Partial {
                source: source.into(),
                path: None,
            },
        );
    }

    /// Register the controller for a module, replacing any previous one.
    pub fn register_controller(
        &mut self,
        name: impl Into<String>,
        controller: impl Controller + 'static,
    ) {
        self.controllers.insert(name.into(), Arc::new(controller));
    }

    /// Partial registered under `name`.
    #[must_use]
    pub fn partial(&self, name: &str) -> Option<&Partial> {
        self.partials.get(name)
    }

    /// All partials in name order.
    pub fn partials(&self) -> impl Iterator<Item = (&str, &Partial)> {
        self.partials.iter().map(|(name, p)| (name.as_str(), p))
    }

    /// Controller registered under `name`.
    #[must_use]
    pub fn controller(&self, name: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(name)
    }

    /// Names of all known modules (with a partial, a controller, or both).
    #[must_use]
    pub fn module_names(&self) -> BTreeSet<&str> {
        self.partials
            .keys()
            .chain(self.controllers.keys())
            .map(String::as_str)
            .collect()
    }

    /// Run the controller for `name` on `data`.
    ///
    /// Without a controller the payload is returned unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the controller's error.
    pub fn dispatch(
        &self,
        name: &str,
        data: Value,
        ctx: &RenderContext,
    ) -> Result<Value, ControllerError> {
        match self.controllers.get(name) {
            Some(controller) => {
                tracing::trace!(module = name, "Dispatching controller");
                controller.transform(data, ctx)
            }
            None => Ok(data),
        }
    }
}

/// Whether descending into `child` would revisit `dir` or one of its
/// ancestors through a symlink.
fn loops_back(dir: &Path, child: &Path) -> bool {
    match (fs::canonicalize(dir), fs::canonicalize(child)) {
        (Ok(dir), Ok(child)) => dir.starts_with(child),
        _ => false,
    }
}

/// Module name for a partial file name: everything before the first `.`.
fn module_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestInfo;
    use folio_content::RouteTable;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context() -> RenderContext {
        RenderContext::new(RequestInfo::new("GET", "/"), Arc::new(RouteTable::default()))
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("navigation.html"), "navigation");
        assert_eq!(module_name("hero.partial.j2"), "hero");
    }

    #[test]
    fn test_load_scans_recursively() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "core/core.html", "<main>{{ title }}</main>");
        write(temp.path(), "navigation/navigation.jinja", "<nav></nav>");
        write(temp.path(), "navigation/README.md", "docs");
        write(temp.path(), ".cache/x.html", "hidden");

        let mut registry = ModuleRegistry::new();
        let count = registry.load(temp.path()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            registry.partial("core").unwrap().source,
            "<main>{{ title }}</main>"
        );
        assert!(registry.partial("navigation").is_some());
        assert!(registry.partial("x").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_follows_symlinked_module_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let modules = temp.path().join("modules");
        write(temp.path(), "theme/hero/hero.html", "<header></header>");
        write(&modules, "core/core.html", "{{ include('hero') }}");
        std::os::unix::fs::symlink(temp.path().join("theme"), modules.join("theme")).unwrap();
        std::os::unix::fs::symlink(&modules, modules.join("self")).unwrap();

        let mut registry = ModuleRegistry::new();
        let count = registry.load(&modules).unwrap();

        assert_eq!(count, 2);
        assert_eq!(registry.partial("hero").unwrap().source, "<header></header>");
    }

    #[test]
    fn test_load_duplicate_partial_later_wins() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "a/card.html", "first");
        write(temp.path(), "b/card.html", "second");

        let mut registry = ModuleRegistry::new();
        registry.load(temp.path()).unwrap();
        assert_eq!(registry.partial("card").unwrap().source, "second");
    }

    #[test]
    fn test_load_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let err = ModuleRegistry::new()
            .load(&temp.path().join("modules"))
            .unwrap_err();
        assert!(matches!(err, ModuleError::RootNotFound(_)));
    }

    #[test]
    fn test_dispatch_without_controller_is_identity() {
        let registry = ModuleRegistry::new();
        let data = json!({"title": "Home"});
        let out = registry.dispatch("page", data.clone(), &context()).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_dispatch_replaces_payload() {
        let mut registry = ModuleRegistry::new();
        registry.register_controller(
            "hero",
            |_data: Value, _ctx: &RenderContext| -> Result<Value, ControllerError> {
                Ok(json!({"x": 1}))
            },
        );

        let out = registry
            .dispatch("hero", json!({"title": "ignored"}), &context())
            .unwrap();
        assert_eq!(out, json!({"x": 1}));
    }

    #[test]
    fn test_dispatch_propagates_failure() {
        let mut registry = ModuleRegistry::new();
        registry.register_controller(
            "broken",
            |_data: Value, _ctx: &RenderContext| -> Result<Value, ControllerError> {
                Err(ControllerError::new("boom"))
            },
        );

        let err = registry.dispatch("broken", json!({}), &context()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_module_names_union() {
        let mut registry = ModuleRegistry::with_builtin_controllers();
        registry.register_partial("hero", "<h1></h1>");
        registry.register_partial("page", "<p></p>");

        let names: Vec<_> = registry.module_names().into_iter().collect();
        assert_eq!(names, vec!["article", "core", "hero", "navigation", "page"]);
    }
}
