//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `lanscout sweep` - Validate the local /24 and probe every host (default)
//! - `lanscout identity` - Validate the local /24 only
//! - `lanscout interfaces` - List classified interfaces

mod identity;
mod interfaces;
mod sweep;

pub use identity::IdentityCommand;
pub use interfaces::InterfacesCommand;
pub use sweep::SweepCommand;

use crate::config::AppSettings;
use crate::discovery::{DiscoveryOptions, TieBreak};
use crate::error::CliResult;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// lanscout - discover live hosts on the local /24.
///
/// Cross-checks the primary interface address against the outbound route
/// and the hostname lookup, then sweeps the 254 host addresses of the
/// validated subnet with ICMP echo or TCP connect probes.
#[derive(Parser, Debug)]
#[command(name = "lanscout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local /24 host discovery", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to `sweep`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the local subnet and sweep it for live hosts
    #[command(alias = "s")]
    Sweep(SweepCommand),

    /// Validate the local subnet without sweeping
    #[command(alias = "id")]
    Identity(IdentityCommand),

    /// List interfaces and the primary address candidate
    #[command(alias = "if")]
    Interfaces(InterfacesCommand),
}

/// Flags shared by every command that inspects interfaces.
#[derive(Args, Debug, Clone, Default)]
pub struct DiscoveryArgs {
    /// Primary interface name; repeat to allow several (replaces configured names)
    #[arg(short = 'i', long = "interface", value_name = "NAME")]
    pub interfaces: Vec<String>,

    /// How to choose among several primary address candidates
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreak>,
}

impl DiscoveryArgs {
    /// Write these flags over `settings`.
    pub fn apply(&self, settings: &mut AppSettings) {
        if !self.interfaces.is_empty() {
            settings.primary_interfaces = self.interfaces.clone();
        }
        if let Some(tie_break) = self.tie_break {
            settings.tie_break = tie_break;
        }
    }
}

/// Discovery options from merged settings.
pub fn discovery_options(settings: &AppSettings) -> CliResult<DiscoveryOptions> {
    Ok(DiscoveryOptions {
        names: settings.interface_names(),
        tie_break: settings.tie_break,
        allowed_range: settings.allowed_range()?,
    })
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis (sweep only)
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
