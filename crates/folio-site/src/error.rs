//! Site errors.

use folio_content::ContentError;
use folio_modules::ModuleError;
use folio_render::RenderError;

/// Error raised while loading a site or rendering a route.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Content could not be loaded.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Module partials could not be loaded.
    #[error(transparent)]
    Modules(#[from] ModuleError),

    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}
