//! Interfaces subcommand implementation.

use crate::cli::{DiscoveryArgs, OutputFormat};
use crate::config::AppSettings;
use crate::discovery::{
    inspect, primary_candidate, NetworkInterface, PrimaryCandidate, SystemInterfaces,
};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::Parser;
use serde::Serialize;
use std::io;

/// List classified interfaces and the primary address candidate.
#[derive(Parser, Debug, Clone, Default)]
pub struct InterfacesCommand {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Output format (plain or json)
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

#[derive(Serialize)]
struct InterfaceListing<'a> {
    interfaces: &'a [NetworkInterface],
    primary: Option<&'a PrimaryCandidate>,
}

impl InterfacesCommand {
    /// Execute the interfaces command.
    pub fn execute(&self, base: &AppSettings) -> CliResult<()> {
        if self.output == OutputFormat::Csv {
            return Err(CliError::Other(
                "csv output is only available for sweep".to_string(),
            ));
        }

        let mut settings = base.clone();
        self.discovery.apply(&mut settings);

        let interfaces = inspect(&SystemInterfaces::new(), &settings.interface_names())?;
        let primary = primary_candidate(&interfaces, settings.tie_break);

        match self.output {
            OutputFormat::Json => output::print_json(&InterfaceListing {
                interfaces: &interfaces,
                primary: primary.as_ref(),
            })?,
            _ => output::write_interfaces(&interfaces, primary.as_ref(), io::stdout().lock())?,
        }

        Ok(())
    }
}
