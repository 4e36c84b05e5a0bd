//! Identity subcommand implementation.
//!
//! Handles `lanscout identity`: runs discovery and validation, then stops.

use crate::cli::{discovery_options, DiscoveryArgs, OutputFormat};
use crate::config::AppSettings;
use crate::discovery::{DiscoveryContext, SystemIdentity, SystemInterfaces};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::Parser;
use std::io;

/// Validate the local /24 without sweeping it.
#[derive(Parser, Debug, Clone, Default)]
pub struct IdentityCommand {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Output format (plain or json)
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl IdentityCommand {
    /// Execute the identity command.
    pub async fn execute(&self, base: &AppSettings, quiet: bool) -> CliResult<()> {
        if self.output == OutputFormat::Csv {
            return Err(CliError::Other(
                "csv output is only available for sweep".to_string(),
            ));
        }

        let mut settings = base.clone();
        self.discovery.apply(&mut settings);
        let options = discovery_options(&settings)?;

        let ctx = DiscoveryContext::establish(
            &options,
            &SystemInterfaces::new(),
            &SystemIdentity::new(settings.route_target),
        )
        .await?;

        match self.output {
            OutputFormat::Json => output::print_json(&ctx)?,
            _ => {
                output::write_identity(&ctx, io::stdout().lock())?;
                if !quiet {
                    output::print_success(&format!("{} is safe to sweep", ctx.subnet));
                }
            }
        }

        Ok(())
    }
}
