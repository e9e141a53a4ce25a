use serde_json::Value;

use crate::{Controller, ControllerError, RenderContext};

/// Page body module. Passes the payload through.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageModule;

impl Controller for PageModule {
    fn transform(&self, data: Value, _ctx: &RenderContext) -> Result<Value, ControllerError> {
        Ok(data)
    }
}
