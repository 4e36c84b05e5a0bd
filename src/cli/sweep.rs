//! Sweep subcommand implementation.
//!
//! Handles `lanscout sweep`: validate the local subnet, then probe all of it.

use crate::cli::{discovery_options, DiscoveryArgs, OutputFormat};
use crate::config::AppSettings;
use crate::discovery::{DiscoveryContext, SystemIdentity, SystemInterfaces};
use crate::error::{CliError, CliResult, ProbeError};
use crate::output;
use crate::scanner::{create_prober, sweep, ProbeMethod, Prober, SweepConfig};
use clap::Parser;

/// Validate the local /24 and sweep it for live hosts.
#[derive(Parser, Debug, Clone, Default)]
pub struct SweepCommand {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Probe method to use
    #[arg(short = 'm', long, value_enum)]
    pub method: Option<ProbeMethod>,

    /// Per-probe timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum number of probes in flight
    #[arg(short = 'c', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Stop the whole sweep after this many milliseconds (0 = no deadline)
    #[arg(short = 'd', long, value_name = "MS")]
    pub deadline: Option<u64>,

    /// Rate limit in probes per second (0 = unlimited)
    #[arg(short = 'r', long = "rate", value_name = "N")]
    pub rate_limit: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl SweepCommand {
    /// Settings with this command's flags applied.
    pub fn merged_settings(&self, base: &AppSettings) -> CliResult<AppSettings> {
        let mut settings = base.clone();
        self.discovery.apply(&mut settings);

        if let Some(method) = self.method {
            settings.probe_method = method;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_ms = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(deadline) = self.deadline {
            settings.deadline_ms = deadline;
        }
        if let Some(rate) = self.rate_limit {
            settings.rate_limit = rate;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Execute the sweep command.
    pub async fn execute(&self, base: &AppSettings, verbose: bool, quiet: bool) -> CliResult<()> {
        let settings = self.merged_settings(base)?;
        let options = discovery_options(&settings)?;

        let ctx = DiscoveryContext::establish(
            &options,
            &SystemInterfaces::new(),
            &SystemIdentity::new(settings.route_target),
        )
        .await?;

        let plain = self.output == OutputFormat::Plain;
        if ctx.has_ambiguous_primary() && !quiet && plain {
            output::print_warning(&format!(
                "Several primary addresses found; chose {} by the {} policy.",
                ctx.subnet.local(),
                settings.tie_break
            ));
        }

        let prober = create_prober(settings.probe_method, &settings.tcp_ports).map_err(|e| {
            match e {
                ProbeError::Unavailable(reason) => CliError::Other(format!(
                    "{} probing unavailable ({}). Run as root or use --method tcp.",
                    settings.probe_method, reason
                )),
                other => CliError::Probe(other),
            }
        })?;

        if !quiet {
            if let Some(warning) = privilege_warning(prober.as_ref(), is_root()) {
                output::print_warning(&warning);
            }
        }

        // Print sweep header (unless JSON/CSV output for clean parsing)
        if !quiet && plain {
            output::print_sweep_header(&ctx.subnet, settings.probe_method, settings.timeout());
        }

        let config = SweepConfig::new()
            .with_timeout(settings.timeout())
            .with_concurrency(settings.concurrency)
            .with_deadline(settings.deadline())
            .with_rate_limit(settings.rate_limit);

        let config = if verbose && !quiet {
            config.with_verbose()
        } else {
            config
        };

        let report = sweep(prober, &ctx.subnet, &config).await;

        if report.skipped > 0 && !quiet && plain {
            output::print_warning(&format!(
                "Deadline expired; {} hosts were not probed and are reported down.",
                report.skipped
            ));
        }

        output::format_results(&report, self.output)?;

        Ok(())
    }
}

/// Warning for a privileged prober running without root.
fn privilege_warning(prober: &dyn Prober, root: bool) -> Option<String> {
    (prober.requires_privileges() && !root).then(|| {
        format!(
            "{} probing without root needs unprivileged sockets; \
             results may be incomplete. Use --method tcp if no hosts respond.",
            prober.method()
        )
    })
}

/// Check if running with root/admin privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
