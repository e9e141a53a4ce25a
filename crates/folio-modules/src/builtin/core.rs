use serde_json::Value;

use crate::{Controller, ControllerError, RenderContext};

/// Root layout module. Passes the payload through.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreModule;

impl Controller for CoreModule {
    fn transform(&self, data: Value, _ctx: &RenderContext) -> Result<Value, ControllerError> {
        Ok(data)
    }
}
