//! CSV output formatting.

use crate::scanner::SweepReport;
use std::io;

/// Print results in CSV format.
pub fn print_csv(report: &SweepReport) -> io::Result<()> {
    write_csv(report, io::stdout().lock())
}

/// Write one row per host address, responsive or not.
pub fn write_csv<W: io::Write>(report: &SweepReport, writer: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["address", "octet", "reachable", "rtt_ms"])?;

    for (octet, address) in report.subnet.hosts() {
        let rtt = report
            .hosts
            .iter()
            .find(|h| h.octet == octet)
            .and_then(|h| h.rtt_ms)
            .map_or(String::new(), |ms| format!("{:.3}", ms));

        wtr.write_record([
            &address.to_string(),
            &octet.to_string(),
            &report.reachability.is_reachable(octet).to_string(),
            &rtt,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
