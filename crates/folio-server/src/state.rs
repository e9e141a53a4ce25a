//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use folio_site::Site;

/// Application state shared across all handlers.
#[derive(Debug)]
pub struct AppState {
    /// Loaded site. Read-only while serving.
    pub(crate) site: Arc<Site>,
    /// Directory served as static files.
    pub(crate) compiled_dir: PathBuf,
}

impl AppState {
    /// Create state for a loaded site and its compiled assets directory.
    #[must_use]
    pub fn new(site: Arc<Site>, compiled_dir: impl Into<PathBuf>) -> Self {
        Self {
            site,
            compiled_dir: compiled_dir.into(),
        }
    }
}
