//! Immutable site bundle.
//!
//! A [`Site`] is assembled once at startup from the content directory, the
//! global content folder and the modules directory. It is never mutated
//! afterwards and is shared between requests behind an `Arc`.

use std::sync::Arc;

use folio_config::SiteConfig;
use folio_content::{RouteTable, RouteTableBuilder, load_global};
use folio_modules::{ModuleRegistry, RenderContext, RequestInfo, ResponseMeta};
use folio_render::Renderer;

use crate::{SiteError, ValidationReport};

/// Result of rendering one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The route declares a template and was rendered.
    Rendered(RenderedPage),
    /// The route exists but declares no template.
    Untemplated,
    /// No route is registered at the path.
    NotFound,
}

/// HTML produced for a route plus what controllers set on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Rendered HTML.
    pub html: String,
    /// Status and headers requested by controllers.
    pub response: ResponseMeta,
}

/// Loaded site: routes, modules and renderer.
#[derive(Debug)]
pub struct Site {
    routes: Arc<RouteTable>,
    renderer: Renderer,
    root_module: String,
}

impl Site {
    /// Load a site with the built-in controllers.
    ///
    /// # Errors
    ///
    /// Returns an error if content, global content or modules cannot be
    /// loaded, or a partial does not compile.
    pub fn load(config: &SiteConfig) -> Result<Self, SiteError> {
        Self::load_with_registry(config, ModuleRegistry::with_builtin_controllers())
    }

    /// Load a site, scanning partials into a registry that already holds the
    /// application's controllers.
    ///
    /// # Errors
    ///
    /// Same as [`Site::load`].
    pub fn load_with_registry(
        config: &SiteConfig,
        mut registry: ModuleRegistry,
    ) -> Result<Self, SiteError> {
        let global = load_global(&config.content_dir.join(&config.global_dir))?;
        registry.load(&config.modules_dir)?;
        let routes = RouteTableBuilder::new(&config.content_dir)
            .global_dir(&config.global_dir)
            .routes_file(&config.routes_file)
            .strict(config.strict_routes)
            .build()?;

        let renderer = Renderer::new(Arc::new(registry), global)?
            .with_max_include_depth(config.max_include_depth);

        tracing::info!(
            routes = routes.len(),
            root_module = %config.root_module,
            "Site loaded"
        );

        Ok(Self {
            routes: Arc::new(routes),
            renderer,
            root_module: config.root_module.clone(),
        })
    }

    /// Assemble a site from already-loaded parts.
    #[must_use]
    pub fn from_parts(
        routes: RouteTable,
        renderer: Renderer,
        root_module: impl Into<String>,
    ) -> Self {
        Self {
            routes: Arc::new(routes),
            renderer,
            root_module: root_module.into(),
        }
    }

    /// Route table.
    #[must_use]
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Renderer.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Module rendered at the root of every page.
    #[must_use]
    pub fn root_module(&self) -> &str {
        &self.root_module
    }

    /// Render the route at `path` for a request.
    ///
    /// The stored content is deep-copied first, so nothing a controller does
    /// to the payload outlives the request.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Render`] if a controller or partial fails.
    pub fn render_route(
        &self,
        path: &str,
        request: RequestInfo,
    ) -> Result<RouteOutcome, SiteError> {
        let Some(entry) = self.routes.get(path) else {
            return Ok(RouteOutcome::NotFound);
        };
        if entry.template().is_none() {
            tracing::debug!(path, "Route has no template");
            return Ok(RouteOutcome::Untemplated);
        }

        let ctx = RenderContext::new(request, Arc::clone(&self.routes));
        let html = self
            .renderer
            .render(&self.root_module, entry.to_payload(), &ctx)?;

        Ok(RouteOutcome::Rendered(RenderedPage {
            html,
            response: ctx.response().snapshot(),
        }))
    }

    /// Check the site for problems worth reporting before serving.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        ValidationReport::build(&self.routes, self.renderer.registry(), &self.root_module)
    }
}
