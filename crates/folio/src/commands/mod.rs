//! CLI command implementations.

pub(crate) mod assets;
pub(crate) mod check;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use assets::AssetsArgs;
pub(crate) use check::CheckArgs;
pub(crate) use serve::ServeArgs;

/// Arguments shared by every command.
#[derive(Args, Debug)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Site root; content, modules and assets resolve against it (overrides config).
    #[arg(long, env = "FOLIO_SITE_ROOT")]
    pub site_root: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration with the shared overrides plus `settings`.
    pub(crate) fn load_config(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.site_root.clone_from(&self.site_root);
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}
