//! Module rendering with minijinja.
//!
//! Every partial in the [`ModuleRegistry`] is compiled into one environment at
//! construction. Rendering a module:
//!
//! 1. merges the global content into the payload under `global`,
//! 2. runs the module's controller,
//! 3. evaluates the module's partial with the resulting payload.
//!
//! Partials render other modules through the `include` function. The state
//! of the current request travels to nested renders through a hidden scope
//! object in the template context, which also carries the include depth.

use std::collections::BTreeMap;
use std::sync::Arc;

use folio_content::render_markdown;
use folio_modules::{ModuleRegistry, RenderContext};
use minijinja::value::{Object, ObjectRepr};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, State, Value, context};
use serde_json::{Map, Value as JsonValue};

use crate::RenderError;

/// Name of the placeholder partial rendered for unknown modules.
pub const MISSING_MODULE: &str = "_missing_module";

/// Default limit for nested `include` calls.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Reserved payload key holding the global content.
pub const GLOBAL_KEY: &str = "global";

const MISSING_MODULE_SOURCE: &str =
    r#"<br><span style="color: red;">Module "{{ data.missing_module }}" cannot be found!</span>"#;

/// Context key of the per-level render scope.
const SCOPE_KEY: &str = "__scope";

/// Renders modules to HTML.
///
/// Immutable after construction and safe to share between requests.
pub struct Renderer {
    env: Environment<'static>,
    registry: Arc<ModuleRegistry>,
    global: Arc<JsonValue>,
    max_depth: usize,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("registry", &self.registry)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// State shared by every level of one top-level render.
#[derive(Debug)]
struct RenderShared {
    registry: Arc<ModuleRegistry>,
    global: Arc<JsonValue>,
    max_depth: usize,
    ctx: RenderContext,
}

/// Per-level state visible to `include`.
#[derive(Debug)]
struct RenderScope {
    depth: usize,
    payload: JsonValue,
    shared: Arc<RenderShared>,
}

impl Object for RenderScope {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }
}

impl Renderer {
    /// Compile every partial in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Compile`] if a partial has a syntax error.
    pub fn new(registry: Arc<ModuleRegistry>, global: JsonValue) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_function("include", include);
        env.add_filter("markdown", markdown);

        // Registered first so a module partial of the same name replaces it
        env.add_template(MISSING_MODULE, MISSING_MODULE_SOURCE)
            .map_err(|source| RenderError::Compile {
                module: MISSING_MODULE.to_owned(),
                source,
            })?;

        for (name, partial) in registry.partials() {
            env.add_template_owned(name.to_owned(), partial.source.clone())
                .map_err(|source| RenderError::Compile {
                    module: name.to_owned(),
                    source,
                })?;
        }

        Ok(Self {
            env,
            registry,
            global: Arc::new(global),
            max_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        })
    }

    /// Set the maximum depth of nested `include` calls.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Module registry the renderer was built from.
    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Global content merged into every render.
    #[must_use]
    pub fn global(&self) -> &JsonValue {
        &self.global
    }

    /// Render `module` with `data`.
    ///
    /// Unknown modules render the placeholder partial instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if a controller fails, a partial fails to evaluate, or
    /// includes nest deeper than the configured limit.
    pub fn render(
        &self,
        module: &str,
        data: JsonValue,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        let shared = Arc::new(RenderShared {
            registry: Arc::clone(&self.registry),
            global: Arc::clone(&self.global),
            max_depth: self.max_depth,
            ctx: ctx.clone(),
        });
        render_module(&self.env, &shared, module, data, 0)
    }
}

fn render_module(
    env: &Environment<'_>,
    shared: &Arc<RenderShared>,
    module: &str,
    data: JsonValue,
    depth: usize,
) -> Result<String, RenderError> {
    if depth > shared.max_depth {
        return Err(RenderError::RecursionLimit {
            limit: shared.max_depth,
        });
    }

    let template_error = |source| RenderError::Template {
        module: module.to_owned(),
        source,
    };

    if shared.registry.partial(module).is_none() {
        tracing::debug!(module, "Unknown module, rendering placeholder");
        let template = env.get_template(MISSING_MODULE).map_err(template_error)?;
        return template
            .render(context! { data => context! { missing_module => module } })
            .map_err(template_error);
    }

    let payload = with_global(data, &shared.global);
    let payload = shared
        .registry
        .dispatch(module, payload, &shared.ctx)
        .map_err(|source| RenderError::Controller {
            module: module.to_owned(),
            source,
        })?;
    let payload = with_global(payload, &shared.global);

    let mut vars: BTreeMap<String, Value> = payload
        .as_object()
        .into_iter()
        .flatten()
        .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
        .collect();
    vars.insert(
        SCOPE_KEY.to_owned(),
        Value::from_object(RenderScope {
            depth,
            payload,
            shared: Arc::clone(shared),
        }),
    );

    let template = env.get_template(module).map_err(template_error)?;
    template.render(Value::from_iter(vars)).map_err(template_error)
}

/// Wrap non-mapping payloads and insert the global content.
fn with_global(data: JsonValue, global: &JsonValue) -> JsonValue {
    let mut map = match data {
        JsonValue::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_owned(), other);
            map
        }
    };
    map.insert(GLOBAL_KEY.to_owned(), global.clone());
    JsonValue::Object(map)
}

/// `include(name, data?)`: render another module in place.
///
/// Without `data` the current payload is passed on.
fn include(state: &State, name: &str, data: Option<Value>) -> Result<Value, Error> {
    let scope = state
        .lookup(SCOPE_KEY)
        .and_then(|value| value.downcast_object::<RenderScope>())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                "include() is only available while rendering a module",
            )
        })?;

    let payload = match data {
        Some(value) => serde_json::to_value(&value).map_err(|e| {
            Error::new(ErrorKind::BadSerialization, "include() data is not serializable")
                .with_source(e)
        })?,
        None => scope.payload.clone(),
    };

    let html = render_module(state.env(), &scope.shared, name, payload, scope.depth + 1)
        .map_err(|e| {
            Error::new(ErrorKind::InvalidOperation, format!("include({name:?}) failed"))
                .with_source(e)
        })?;
    Ok(Value::from_safe_string(html))
}

/// `markdown` filter: render a string as Markdown.
fn markdown(value: &str) -> Value {
    Value::from_safe_string(render_markdown(value))
}
