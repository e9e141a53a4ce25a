//! Controller trait.

use serde_json::Value;

use crate::RenderContext;

/// Error returned by a controller transform.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Controller-defined failure.
    #[error("{0}")]
    Message(String),

    /// The payload did not have the expected shape.
    #[error("expected {expected} payload")]
    InvalidPayload {
        /// Description of the expected shape.
        expected: &'static str,
    },

    /// (De)serialization between typed data and the payload failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ControllerError {
    /// Create a controller-defined failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Data-shaping function attached to a module.
///
/// `transform` receives the request-scoped payload and returns the payload the
/// module's partial is rendered with. Returning the (mutated) input and
/// returning a fresh value are both fine.
///
/// Any `Fn(Value, &RenderContext) -> Result<Value, ControllerError>` closure is
/// a controller:
///
/// ```
/// use folio_modules::{ControllerError, ModuleRegistry, RenderContext};
/// use serde_json::{Value, json};
///
/// let mut registry = ModuleRegistry::new();
/// registry.register_controller("hero", |mut data: Value, _ctx: &RenderContext| {
///     data["x"] = json!(1);
///     Ok::<_, ControllerError>(data)
/// });
/// assert!(registry.controller("hero").is_some());
/// ```
pub trait Controller: Send + Sync {
    /// Transform the payload for rendering.
    fn transform(&self, data: Value, ctx: &RenderContext) -> Result<Value, ControllerError>;
}

impl<F> Controller for F
where
    F: Fn(Value, &RenderContext) -> Result<Value, ControllerError> + Send + Sync,
{
    fn transform(&self, data: Value, ctx: &RenderContext) -> Result<Value, ControllerError> {
        self(data, ctx)
    }
}
