//! Site loading and route rendering for folio.
//!
//! This crate provides:
//! - [`Site`]: the immutable bundle of routes, modules and renderer built once
//!   at startup
//! - [`RouteOutcome`]: what serving a path produced
//! - [`ValidationReport`]: startup checks for collisions and unknown templates
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), folio_site::SiteError> {
//! use folio_config::SiteConfig;
//! use folio_modules::RequestInfo;
//! use folio_site::{RouteOutcome, Site};
//!
//! let site = Site::load(&SiteConfig::with_base(std::path::Path::new("site")))?;
//! if let RouteOutcome::Rendered(page) = site.render_route("/", RequestInfo::new("GET", "/"))? {
//!     println!("{}", page.html);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod site;
mod validation;

pub use error::SiteError;
pub use site::{RenderedPage, RouteOutcome, Site};
pub use validation::{UnknownTemplate, ValidationReport};
