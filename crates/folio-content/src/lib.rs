//! Content loading for folio.
//!
//! This crate turns a content directory into data the renderer can use:
//!
//! - [`RouteTableBuilder`]: walks the content tree and maps URL paths to
//!   parsed [`ContentEntry`] values
//! - [`load_global`]: concatenates the reserved global folder into one mapping
//! - [`ContentFormat`]: YAML and the delimited text format
//! - [`apply_pipe`] / [`render_markdown`]: value pipes used by the text format
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), folio_content::ContentError> {
//! use folio_content::{RouteTableBuilder, load_global};
//!
//! let global = load_global(std::path::Path::new("content/_global"))?;
//! let routes = RouteTableBuilder::new("content").build()?;
//! for (path, entry) in routes.iter() {
//!     println!("{path} -> {}", entry.source().display());
//! }
//! # Ok(())
//! # }
//! ```

mod entry;
mod error;
mod format;
mod global;
mod pipes;
mod routes;

pub use entry::{ContentEntry, Settings};
pub use error::ContentError;
pub use format::ContentFormat;
pub use global::load_global;
pub use pipes::{apply_pipe, render_markdown};
pub use routes::{RouteCollision, RouteTable, RouteTableBuilder};
