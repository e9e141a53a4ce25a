//! Controllers shipped with folio.
//!
//! Built-in controllers follow the `<Module>Module` naming convention and are
//! registered under the lowercase module name.

mod article;
mod core;
mod navigation;
mod page;

pub use self::article::ArticleModule;
pub use self::core::CoreModule;
pub use self::navigation::NavigationModule;
pub use self::page::PageModule;

use crate::ModuleRegistry;

pub(crate) fn register_all(registry: &mut ModuleRegistry) {
    registry.register_controller("core", CoreModule);
    registry.register_controller("page", PageModule);
    registry.register_controller("navigation", NavigationModule);
    registry.register_controller("article", ArticleModule);
}
