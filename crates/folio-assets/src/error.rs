//! Asset pipeline errors.

use std::fmt;
use std::path::PathBuf;

/// Pipeline step, used as the prefix of every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStep {
    /// Copy `vendor/` into the compiled directory.
    CopyVendor,
    /// Copy `media/` into the compiled directory.
    CopyMedia,
    /// Compile `styles/main.scss`.
    CompileStyles,
    /// Bundle `scripts/main.ts`.
    CompileScripts,
}

impl fmt::Display for AssetStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CopyVendor => "copy vendor",
            Self::CopyMedia => "copy media",
            Self::CompileStyles => "compile styles",
            Self::CompileScripts => "compile scripts",
        })
    }
}

/// Error raised by the asset pipeline. Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Reading or writing a file failed.
    #[error("{step}: {}: {source}", path.display())]
    Io {
        /// Failing step.
        step: AssetStep,
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configured command is empty.
    #[error("{step}: command is empty")]
    EmptyCommand {
        /// Failing step.
        step: AssetStep,
    },

    /// The command's program is not installed.
    #[error("{step}: `{program}` not found. Please install it first.")]
    ProgramNotFound {
        /// Failing step.
        step: AssetStep,
        /// Program name.
        program: String,
    },

    /// The command ran and failed.
    #[error("{step}: `{program}` failed ({status}): {stderr}")]
    CommandFailed {
        /// Failing step.
        step: AssetStep,
        /// Program name.
        program: String,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

impl AssetError {
    /// Step the error belongs to.
    #[must_use]
    pub fn step(&self) -> AssetStep {
        match self {
            Self::Io { step, .. }
            | Self::EmptyCommand { step }
            | Self::ProgramNotFound { step, .. }
            | Self::CommandFailed { step, .. } => *step,
        }
    }
}
