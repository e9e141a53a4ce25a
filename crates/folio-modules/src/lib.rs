//! Module registry and controller dispatch for folio.
//!
//! A *module* is a named unit of rendering. It may carry a template partial
//! (discovered in the modules directory) and a [`Controller`] (registered in
//! code) that reshapes the payload before the partial sees it.
//!
//! ```
//! use std::sync::Arc;
//!
//! use folio_content::RouteTable;
//! use folio_modules::{ModuleRegistry, RenderContext, RequestInfo};
//! use serde_json::json;
//!
//! let registry = ModuleRegistry::with_builtin_controllers();
//! let ctx = RenderContext::new(RequestInfo::new("GET", "/"), Arc::new(RouteTable::default()));
//! let out = registry.dispatch("unknown", json!({"a": 1}), &ctx).unwrap();
//! assert_eq!(out, json!({"a": 1}));
//! ```

pub mod builtin;
mod context;
mod controller;
mod error;
mod registry;

pub use context::{RenderContext, RequestInfo, ResponseHandle, ResponseMeta};
pub use controller::{Controller, ControllerError};
pub use error::ModuleError;
pub use registry::{ModuleRegistry, Partial};
