//! Rendering errors.

use folio_modules::ControllerError;

/// Error raised while compiling or rendering a module.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Nested `include` calls went deeper than the configured limit.
    #[error("template recursion too deep (limit {limit})")]
    RecursionLimit {
        /// Configured maximum include depth.
        limit: usize,
    },

    /// A module's controller failed.
    #[error("Controller for module `{module}` failed: {source}")]
    Controller {
        /// Module name.
        module: String,
        /// Controller error.
        source: ControllerError,
    },

    /// A partial could not be compiled.
    #[error("Invalid template for module `{module}`: {source}")]
    Compile {
        /// Module name.
        module: String,
        /// Template engine error.
        source: minijinja::Error,
    },

    /// Evaluating a partial failed.
    #[error("Failed to render module `{module}`: {source}")]
    Template {
        /// Module name.
        module: String,
        /// Template engine error.
        source: minijinja::Error,
    },
}

impl RenderError {
    /// Whether this error, or any error it wraps, is a recursion limit error.
    ///
    /// Errors raised inside nested `include` calls reach the caller wrapped in
    /// template errors, so the whole source chain is inspected.
    #[must_use]
    pub fn is_recursion_limit(&self) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(RenderError::RecursionLimit { .. }) = err.downcast_ref::<RenderError>() {
                return true;
            }
            current = err.source();
        }
        false
    }

    /// Controller error at the root of this failure, if any.
    #[must_use]
    pub fn controller_error(&self) -> Option<&ControllerError> {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(RenderError::Controller { source, .. }) = err.downcast_ref::<RenderError>()
            {
                return Some(source);
            }
            current = err.source();
        }
        None
    }
}
