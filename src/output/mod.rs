//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of sweep results.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv};
pub use json_format::print_json;
pub use plain::{
    print_error, print_success, print_sweep_header, print_warning, write_identity,
    write_interfaces, write_plain,
};

use crate::cli::OutputFormat;
use crate::scanner::SweepReport;
use std::io;

/// Format and print sweep results according to the specified format.
pub fn format_results(report: &SweepReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(report),
        OutputFormat::Json => json_format::print_json(report),
        OutputFormat::Csv => csv_format::print_csv(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::scanner::{HostResult, ProbeMethod, SweepReport};
    use crate::types::{ReachabilityMap, SubnetIdentity};
    use chrono::Utc;
    use std::net::Ipv4Addr;

    /// A finished sweep of 192.168.1.0/24 where .1 and the local .50 answered.
    pub(crate) fn sample_report() -> SweepReport {
        let subnet = SubnetIdentity::from_address(Ipv4Addr::new(192, 168, 1, 50));
        let mut reachability = ReachabilityMap::new();
        reachability.set(1, true);
        reachability.set(50, true);

        SweepReport {
            subnet,
            method: ProbeMethod::Icmp,
            started_at: Utc::now(),
            completed_at: Utc::now(),
            duration_ms: 1200,
            probed: 254,
            responded: 2,
            errors: 0,
            skipped: 0,
            reachability,
            hosts: vec![
                HostResult {
                    address: Ipv4Addr::new(192, 168, 1, 1),
                    octet: 1,
                    rtt_ms: Some(1.5),
                },
                HostResult {
                    address: Ipv4Addr::new(192, 168, 1, 50),
                    octet: 50,
                    rtt_ms: Some(0.042),
                },
            ],
        }
    }

    #[test]
    fn test_json_report_shape() {
        let value = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(value["subnet"]["network"], "192.168.1.0/24");
        assert_eq!(value["method"], "icmp");
        assert_eq!(value["reachability"], serde_json::json!([1, 50]));
        assert_eq!(value["hosts"][0]["rtt_ms"], 1.5);
    }
}
