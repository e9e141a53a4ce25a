//! Module loading errors.

use std::path::PathBuf;

/// Error raised while scanning the modules directory.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The modules root does not exist.
    #[error("Modules directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A directory or partial could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
