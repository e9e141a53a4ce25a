use serde::Serialize;
use serde_json::Value;

use crate::{Controller, ControllerError, RenderContext};

/// Site navigation built from the route table.
///
/// Every canonical route whose `settings.index` is set becomes a navigation
/// item, ordered by index and then by path. Aliases never get their own item;
/// requesting one marks its target active. The list is written to the
/// payload's `navigation` key.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationModule;

#[derive(Debug, Serialize)]
struct NavItem {
    title: String,
    href: String,
    active: bool,
}

impl Controller for NavigationModule {
    fn transform(&self, mut data: Value, ctx: &RenderContext) -> Result<Value, ControllerError> {
        let routes = ctx.routes();
        let current = ctx.request().path.as_str();
        let aliased = routes
            .get(current)
            .filter(|_| routes.is_alias(current))
            .map(|entry| entry.source());

        let mut indexed: Vec<(i64, NavItem)> = routes
            .canonical()
            .filter_map(|(path, entry)| {
                let settings = entry.settings();
                let index = settings.index?;
                let title = settings
                    .title
                    .or_else(|| entry.data().get("title")?.as_str().map(str::to_owned))
                    .unwrap_or_else(|| path.to_owned());
                Some((
                    index,
                    NavItem {
                        title,
                        href: path.to_owned(),
                        active: path == current || aliased == Some(entry.source()),
                    },
                ))
            })
            .collect();
        // Route iteration is already path-ordered, so a stable sort keeps ties by path
        indexed.sort_by_key(|(index, _)| *index);

        let items: Vec<NavItem> = indexed.into_iter().map(|(_, item)| item).collect();
        let Value::Object(map) = &mut data else {
            return Err(ControllerError::InvalidPayload {
                expected: "a mapping",
            });
        };
        map.insert("navigation".to_owned(), serde_json::to_value(items)?);
        Ok(data)
    }
}
