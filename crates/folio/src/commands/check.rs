//! `folio check` command implementation.

use clap::Args;
use folio_config::CliSettings;
use folio_site::{Site, ValidationReport};

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Treat route collisions as load errors.
    #[arg(long)]
    strict_routes: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the site cannot be loaded or has problems.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings {
            strict_routes: self.strict_routes.then_some(true),
            ..CliSettings::default()
        })?;

        let site = Site::load(&config.site_resolved)?;
        output.info(&format!(
            "Loaded {} routes from {}",
            site.routes().len(),
            config.site_resolved.content_dir.display()
        ));

        let report = site.validate();
        print_report(&output, &report);

        if report.has_problems() {
            return Err(CliError::Validation(
                "Site has problems, see above".to_owned(),
            ));
        }
        output.success("Site OK");
        Ok(())
    }
}

/// Print every finding in `report`. Problems are warnings, the rest is info.
pub(crate) fn print_report(output: &Output, report: &ValidationReport) {
    for collision in &report.collisions {
        output.warning(&format!(
            "Route collision at {}: {} replaced {}",
            collision.path,
            collision.kept.display(),
            collision.replaced.display()
        ));
    }
    for unknown in &report.unknown_templates {
        output.warning(&format!(
            "Route {} uses template `{}` which has no partial",
            unknown.route, unknown.template
        ));
    }
    if report.root_module_missing {
        output.warning("Root module has no partial, every page renders the placeholder");
    }
    for module in &report.modules_without_partials {
        output.info(&format!("Module `{module}` has a controller but no partial"));
    }
    for route in &report.untemplated_routes {
        output.info(&format!("Route {route} has no template and answers 404"));
    }
}
