//! `folio serve` command implementation.

use std::sync::Arc;

use clap::Args;
use folio_assets::AssetPipeline;
use folio_config::CliSettings;
use folio_server::{run_server, server_config_from_config};
use folio_site::Site;

use super::CommonArgs;
use super::check::print_report;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Fail startup on route collisions instead of warning.
    #[arg(long)]
    strict_routes: bool,

    /// Skip the asset pipeline.
    #[arg(long)]
    skip_assets: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, assets or site loading fails, or
    /// the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(self.cli_settings())?;

        if config.assets_resolved.enabled {
            let report = AssetPipeline::new(config.assets_resolved.clone()).run()?;
            output.info(&format!(
                "Assets: {} files copied to {}",
                report.copied_files,
                config.assets_resolved.compiled_dir.display()
            ));
        } else {
            output.info("Assets: skipped");
        }

        let site = Site::load(&config.site_resolved)?;
        let report = site.validate();
        if report.has_problems() {
            print_report(&output, &report);
        }

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Content directory: {}",
            config.site_resolved.content_dir.display()
        ));
        output.info(&format!("Routes: {}", site.routes().len()));

        run_server(server_config_from_config(&config), Arc::new(site)).await?;

        Ok(())
    }

    /// Overrides taken from flags.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            strict_routes: self.strict_routes.then_some(true),
            assets_enabled: self.skip_assets.then_some(false),
            ..CliSettings::default()
        }
    }
}
