//! Startup validation.

use folio_content::{RouteCollision, RouteTable};
use folio_modules::ModuleRegistry;
use folio_render::MISSING_MODULE;

/// A route whose `settings.template` names no known partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTemplate {
    /// Route path.
    pub route: String,
    /// Template name from the content entry.
    pub template: String,
}

/// Problems found in a loaded site.
///
/// Collisions, unknown templates and a missing root partial are problems;
/// modules without partials and untemplated routes are informational.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Route collisions observed while building the route table.
    pub collisions: Vec<RouteCollision>,
    /// Routes naming a template that has no partial.
    pub unknown_templates: Vec<UnknownTemplate>,
    /// Whether the root module has no partial.
    pub root_module_missing: bool,
    /// Modules with a controller but no partial.
    pub modules_without_partials: Vec<String>,
    /// Routes that declare no template and answer 404.
    pub untemplated_routes: Vec<String>,
}

impl ValidationReport {
    pub(crate) fn build(
        routes: &RouteTable,
        registry: &ModuleRegistry,
        root_module: &str,
    ) -> Self {
        let mut report = Self {
            collisions: routes.collisions().to_vec(),
            root_module_missing: registry.partial(root_module).is_none(),
            ..Self::default()
        };

        for (path, entry) in routes.iter() {
            match entry.template() {
                Some(template) if registry.partial(template).is_none() => {
                    report.unknown_templates.push(UnknownTemplate {
                        route: path.to_owned(),
                        template: template.to_owned(),
                    });
                }
                Some(_) => {}
                None => report.untemplated_routes.push(path.to_owned()),
            }
        }

        report.modules_without_partials = registry
            .module_names()
            .into_iter()
            .filter(|name| *name != MISSING_MODULE && registry.partial(name).is_none())
            .map(str::to_owned)
            .collect();

        report
    }

    /// Whether the report contains problems.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.collisions.is_empty()
            || !self.unknown_templates.is_empty()
            || self.root_module_missing
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use folio_config::SiteConfig;
    use pretty_assertions::assert_eq;

    use crate::Site;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_clean_site() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "content/index.yaml", "settings:\n  template: page\n");
        write(temp.path(), "modules/core.html", "{{ include('page') }}");
        write(temp.path(), "modules/page.html", "page");
        write(temp.path(), "modules/navigation.html", "nav");
        write(temp.path(), "modules/article.html", "article");

        let site = Site::load(&SiteConfig::with_base(temp.path())).unwrap();
        let report = site.validate();

        assert!(!report.has_problems());
        assert!(report.modules_without_partials.is_empty());
    }

    #[test]
    fn test_reports_problems() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "content/about.txt", "settings.template: page\n");
        write(temp.path(), "content/about.yaml", "settings:\n  template: gallery\n");
        write(temp.path(), "content/raw.yaml", "title: Raw\n");
        write(temp.path(), "modules/page.html", "page");

        let site = Site::load(&SiteConfig::with_base(temp.path())).unwrap();
        let report = site.validate();

        assert!(report.has_problems());
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.unknown_templates.len(), 1);
        assert_eq!(report.unknown_templates[0].route, "/about");
        assert_eq!(report.unknown_templates[0].template, "gallery");
        assert!(report.root_module_missing);
        assert_eq!(report.untemplated_routes, vec!["/raw".to_owned()]);
        assert_eq!(
            report.modules_without_partials,
            vec!["article".to_owned(), "core".to_owned(), "navigation".to_owned()]
        );
    }
}
