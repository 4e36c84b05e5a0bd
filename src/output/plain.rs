//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::discovery::{DiscoveryContext, InterfaceKind, NetworkInterface, PrimaryCandidate};
use crate::scanner::{ProbeMethod, SweepReport};
use crate::types::SubnetIdentity;
use console::style;
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print sweep results in human-readable plain text format.
pub fn print_plain(report: &SweepReport) -> io::Result<()> {
    write_plain(report, io::stdout().lock())
}

/// Write sweep results in plain text to `out`.
pub fn write_plain<W: Write>(report: &SweepReport, mut out: W) -> io::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Sweep Results",
        style("lanscout").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Subnet:").bold(), report.subnet)?;
    writeln!(
        out,
        "  {} {}",
        style("Local host:").bold(),
        report.subnet.local()
    )?;
    writeln!(out, "  {} {}", style("Method:").bold(), report.method)?;
    writeln!(out)?;

    // Statistics
    writeln!(
        out,
        "  {} {} hosts probed in {:.2}s",
        style("Statistics:").bold(),
        report.probed,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} up, {} errors, {} skipped",
        style(report.responded).green().bold(),
        style(report.errors).red(),
        style(report.skipped).yellow()
    )?;
    writeln!(out)?;

    if report.hosts.is_empty() {
        writeln!(out, "  {}", style("No hosts responded.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<18}  {:>10}  {}",
            style("ADDRESS").bold(),
            style("RTT").bold(),
            style("NOTE").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for host in &report.hosts {
            let rtt = host
                .rtt_ms
                .map_or_else(|| "-".to_string(), |ms| format!("{:.2}ms", ms));
            let note = if host.octet == report.subnet.local_octet() {
                "this host"
            } else {
                ""
            };
            writeln!(
                out,
                "  {:<18}  {:>10}  {}",
                style(host.address).green(),
                rtt,
                style(note).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a header before sweeping begins.
pub fn print_sweep_header(subnet: &SubnetIdentity, method: ProbeMethod, timeout: Duration) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("lanscout").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Probe: {}", style("•").dim(), style(method).yellow());
    println!(
        "{} Subnet: {} (this host {})",
        style("•").dim(),
        style(subnet).white().bold(),
        subnet.local()
    );
    println!(
        "{} Sweeping 254 hosts, {}ms timeout each...",
        style("•").dim(),
        timeout.as_millis()
    );
    println!();
}

/// Print the validated identity.
pub fn write_identity<W: Write>(ctx: &DiscoveryContext, mut out: W) -> io::Result<()> {
    let identity = &ctx.identity;
    let lookup = match identity.lookup {
        Some(ip) if identity.lookup_trusted => ip.to_string(),
        Some(ip) => format!("{} {}", ip, style("(lookup failed)").yellow()),
        None => style("(lookup failed)").yellow().to_string(),
    };

    writeln!(out, "  {} {}", style("Outbound (UDP route):").bold(), identity.outbound)?;
    writeln!(
        out,
        "  {} {}",
        style(format!("Lookup ({}):", identity.hostname)).bold(),
        lookup
    )?;
    if let Some(ref primary) = ctx.primary {
        write_primary(primary, &mut out)?;
    }
    writeln!(out, "  {} {}", style("Subnet:").bold(), style(ctx.subnet).green().bold())?;
    Ok(())
}

fn write_primary<W: Write>(primary: &PrimaryCandidate, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "  {} {} ({})",
        style("Primary interface:").bold(),
        primary.network,
        primary.interface
    )?;
    if primary.is_ambiguous() {
        let others: Vec<String> = primary.alternatives.iter().map(|n| n.to_string()).collect();
        writeln!(
            out,
            "  {} multiple candidates, also saw {}",
            style("!").yellow().bold(),
            others.join(", ")
        )?;
    }
    Ok(())
}

/// Print classified interfaces and the chosen primary address.
pub fn write_interfaces<W: Write>(
    interfaces: &[NetworkInterface],
    primary: Option<&PrimaryCandidate>,
    mut out: W,
) -> io::Result<()> {
    for (i, iface) in interfaces.iter().enumerate() {
        let kind = match iface.kind {
            InterfaceKind::Primary => style(iface.kind).green().bold(),
            InterfaceKind::Loopback => style(iface.kind).dim(),
            InterfaceKind::Other => style(iface.kind),
        };
        writeln!(out, "  [{}] {} {}", i, style(&iface.name).bold(), kind)?;
        for (j, addr) in iface.addresses.iter().enumerate() {
            let suitable = iface.kind == InterfaceKind::Primary && addr.ipv4_network().is_some();
            writeln!(
                out,
                "      adr[{}] {} {}",
                j,
                addr,
                if suitable { "(suitable)" } else { "" }
            )?;
        }
    }

    writeln!(out)?;
    match primary {
        Some(primary) => write_primary(primary, &mut out)?,
        None => writeln!(
            out,
            "  {} no primary interface address",
            style("!").yellow().bold()
        )?,
    }
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}
