use folio_content::render_markdown;
use serde_json::Value;

use crate::{Controller, ControllerError, RenderContext};

/// Article body module.
///
/// Renders the payload's `text` field from Markdown to HTML. Payloads without
/// a string `text` pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleModule;

impl Controller for ArticleModule {
    fn transform(&self, mut data: Value, _ctx: &RenderContext) -> Result<Value, ControllerError> {
        if let Some(Value::String(source)) = data.get_mut("text") {
            *source = render_markdown(source);
        }
        Ok(data)
    }
}
