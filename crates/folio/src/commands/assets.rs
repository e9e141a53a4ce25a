//! `folio assets` command implementation.

use clap::Args;
use folio_assets::AssetPipeline;
use folio_config::CliSettings;

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the assets command.
#[derive(Args, Debug)]
pub(crate) struct AssetsArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl AssetsArgs {
    /// Execute the assets command.
    ///
    /// Runs the pipeline even when `assets.enabled` is false.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any pipeline step fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;

        let report = AssetPipeline::new(config.assets_resolved.clone()).run()?;

        output.success(&format!(
            "Assets written to {} ({} files copied)",
            config.assets_resolved.compiled_dir.display(),
            report.copied_files
        ));
        if let Some(styles) = &report.styles {
            output.info(&format!("Styles: {}", styles.display()));
        }
        if let Some(scripts) = &report.scripts {
            output.info(&format!("Scripts: {}", scripts.display()));
        }
        Ok(())
    }
}
