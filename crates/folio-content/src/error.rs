//! Content loading errors.

use std::path::PathBuf;

/// Error raised while loading content. All of these abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The content root does not exist.
    #[error("Content directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A file or directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A YAML file could not be parsed.
    #[error("Invalid YAML in {}: {source}", path.display())]
    Yaml {
        /// Offending file.
        path: PathBuf,
        /// Parser error.
        source: serde_yaml::Error,
    },

    /// A text content file is malformed.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// 1-based line where the offending block starts.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Parsed content is not a key/value mapping.
    #[error("{}: content must be a mapping of keys to values", path.display())]
    NotAMapping {
        /// Offending file.
        path: PathBuf,
    },

    /// A text field names a pipe that does not exist.
    #[error("{}: unknown pipe `{pipe}` on key `{key}`", path.display())]
    UnknownPipe {
        /// Offending file.
        path: PathBuf,
        /// Field key.
        key: String,
        /// Pipe name.
        pipe: String,
    },

    /// A route path cannot be registered as an exact HTTP path.
    #[error("Route `{route}` derived from {} cannot be registered as an exact path", file.display())]
    InvalidRoutePath {
        /// Route path.
        route: String,
        /// File the route came from.
        file: PathBuf,
    },

    /// Two files map to the same route (only raised in strict mode).
    #[error("Route `{route}` is defined by both {} and {}", replaced.display(), kept.display())]
    RouteCollision {
        /// Route path.
        route: String,
        /// File that would win.
        kept: PathBuf,
        /// File that would be overwritten.
        replaced: PathBuf,
    },

    /// A route alias points to content that was not loaded.
    #[error("Route alias `{route}` points to unknown content `{target}`")]
    UnknownAlias {
        /// Alias route path.
        route: String,
        /// Content key the alias refers to.
        target: String,
    },
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
