//! CLI entry point for lanscout.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use lanscout::cli::{Cli, Commands, SweepCommand};
use lanscout::config::AppSettings;
use lanscout::output;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = AppSettings::resolve(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Some(Commands::Sweep(cmd)) => cmd.execute(&settings, cli.verbose, cli.quiet).await?,
        Some(Commands::Identity(cmd)) => cmd.execute(&settings, cli.quiet).await?,
        Some(Commands::Interfaces(cmd)) => cmd.execute(&settings)?,
        None => {
            SweepCommand::default()
                .execute(&settings, cli.verbose, cli.quiet)
                .await?
        }
    }

    Ok(())
}
