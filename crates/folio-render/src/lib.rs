//! Template rendering for folio.
//!
//! [`Renderer`] compiles the partials of a [`ModuleRegistry`](folio_modules::ModuleRegistry)
//! into a minijinja environment and renders modules by name. Partials can
//! render other modules with `include`:
//!
//! ```jinja
//! <body>
//!   {{ include("navigation") }}
//!   {% for item in items %}{{ include("card", item) }}{% endfor %}
//!   {{ global.footer | markdown }}
//! </body>
//! ```

mod error;
mod renderer;

pub use error::RenderError;
pub use renderer::{DEFAULT_MAX_INCLUDE_DEPTH, GLOBAL_KEY, MISSING_MODULE, Renderer};
