//! Front-end asset pipeline for folio.
//!
//! Runs once before the server starts: copies vendor and media files and
//! delegates SASS and script compilation to external tools. A failure in any
//! step aborts startup.

mod error;
mod pipeline;

pub use error::{AssetError, AssetStep};
pub use pipeline::{AssetPipeline, AssetReport};
