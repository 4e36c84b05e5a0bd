//! Sweep engine - probes every host of a validated /24.
//!
//! Each of the 254 probes is independent, so the sweep is a bounded fan-out
//! on the tokio runtime. A single collector folds results into the
//! preallocated [`ReachabilityMap`]; every result owns a distinct index.

pub mod icmp;
pub mod rate_limiter;
pub mod tcp;
pub mod traits;

pub use icmp::IcmpProber;
pub use rate_limiter::RateLimiter;
pub use tcp::{TcpProber, DEFAULT_TCP_PORTS};
pub use traits::{ProbeMethod, ProbeOutcome, Prober};

use crate::error::{ProbeError, ProbeResult};
use crate::types::{ReachabilityMap, SubnetIdentity, FIRST_HOST, LAST_HOST};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of host addresses in a /24.
pub const HOST_COUNT: usize = (LAST_HOST - FIRST_HOST + 1) as usize;

/// Default per-probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

/// Default number of probes in flight.
pub const DEFAULT_CONCURRENCY: usize = 32;

/// Configuration for one sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Per-probe timeout.
    pub timeout: Duration,
    /// Maximum probes in flight.
    pub concurrency: usize,
    /// Whole-sweep deadline; unprobed hosts count as unreachable.
    pub deadline: Option<Duration>,
    /// Probes per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Show a progress bar.
    pub verbose: bool,
}

impl SweepConfig {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
            rate_limit: 0,
            verbose: false,
        }
    }

    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the concurrency level.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the whole-sweep deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the rate limit.
    pub fn with_rate_limit(mut self, rate: u32) -> Self {
        self.rate_limit = rate;
        self
    }

    /// Enable the progress bar.
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A host that responded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResult {
    pub address: Ipv4Addr,
    pub octet: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtt_ms: Option<f64>,
}

/// Complete sweep results.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub subnet: SubnetIdentity,
    pub method: ProbeMethod,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Probes that completed (responded, silent or failed).
    pub probed: usize,
    pub responded: usize,
    /// Probes that failed with an error; recorded unreachable.
    pub errors: usize,
    /// Hosts never probed because the deadline expired.
    pub skipped: usize,
    pub reachability: ReachabilityMap,
    pub hosts: Vec<HostResult>,
}

impl SweepReport {
    /// True when the local host answered its own probe.
    pub fn local_responded(&self) -> bool {
        self.reachability.is_reachable(self.subnet.local_octet())
    }
}

enum Verdict {
    Responded(Option<Duration>),
    Silent,
    Failed(ProbeError),
}

/// Probe one host, bounding the call by `limit`.
async fn probe_host(prober: &dyn Prober, ip: Ipv4Addr, limit: Duration) -> Verdict {
    match tokio::time::timeout(limit, prober.probe(ip, limit)).await {
        Ok(Ok(outcome)) if outcome.responded => Verdict::Responded(outcome.rtt),
        Ok(Ok(_)) | Ok(Err(ProbeError::Timeout)) | Err(_) => Verdict::Silent,
        Ok(Err(e)) => Verdict::Failed(e),
    }
}

/// Sweep every host of `subnet`.
///
/// Probe errors and timeouts are recorded as unreachable and never abort the
/// sweep. No probe is retried.
pub async fn sweep(
    prober: Arc<dyn Prober>,
    subnet: &SubnetIdentity,
    config: &SweepConfig,
) -> SweepReport {
    let started_at = Utc::now();
    let start_time = Instant::now();
    let concurrency = config.concurrency.clamp(1, HOST_COUNT);
    let limiter = RateLimiter::from_rate(config.rate_limit);

    tracing::info!(
        %subnet,
        method = %prober.method(),
        timeout_ms = config.timeout.as_millis() as u64,
        concurrency,
        "Sweeping {} hosts",
        HOST_COUNT
    );

    let progress = config.verbose.then(|| {
        let pb = ProgressBar::new(HOST_COUNT as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb
    });

    let deadline = config.deadline;
    let expired = async move {
        match deadline {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    let probes = stream::iter(subnet.hosts())
        .map(|(octet, ip)| {
            let prober = Arc::clone(&prober);
            let limiter = limiter.clone();
            let timeout = config.timeout;

            async move {
                if let Some(ref limiter) = limiter {
                    limiter.wait().await;
                }
                (octet, ip, probe_host(prober.as_ref(), ip, timeout).await)
            }
        })
        .buffer_unordered(concurrency)
        .take_until(expired);
    futures::pin_mut!(probes);

    let mut reachability = ReachabilityMap::new();
    let mut rtts: [Option<Duration>; 256] = [None; 256];
    let mut probed = 0usize;
    let mut errors = 0usize;

    while let Some((octet, ip, verdict)) = probes.next().await {
        probed += 1;
        match verdict {
            Verdict::Responded(rtt) => {
                tracing::info!("{} responded, RTT: {:?}", ip, rtt.unwrap_or_default());
                reachability.set(octet, true);
                rtts[octet as usize] = rtt;
                if let Some(ref pb) = progress {
                    pb.set_message(format!("{} up", ip));
                }
            }
            Verdict::Silent => reachability.set(octet, false),
            Verdict::Failed(e) => {
                tracing::debug!("probe {} failed: {}", ip, e);
                errors += 1;
                reachability.set(octet, false);
            }
        }
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    let skipped = HOST_COUNT - probed;
    if skipped > 0 {
        tracing::warn!(skipped, "Sweep deadline expired, remaining hosts recorded unreachable");
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Sweep complete");
    }

    let hosts: Vec<HostResult> = reachability
        .reachable_octets()
        .filter_map(|octet| {
            subnet.host(octet).map(|address| HostResult {
                address,
                octet,
                rtt_ms: rtts[octet as usize].map(|d| d.as_micros() as f64 / 1000.0),
            })
        })
        .collect();

    let responded = reachability.count();
    tracing::info!(responded, probed, errors, skipped, "Sweep of {} complete", subnet);

    SweepReport {
        subnet: *subnet,
        method: prober.method(),
        started_at,
        completed_at: Utc::now(),
        duration_ms: start_time.elapsed().as_millis() as u64,
        probed,
        responded,
        errors,
        skipped,
        reachability,
        hosts,
    }
}

/// Build the prober for `method`.
pub fn create_prober(method: ProbeMethod, tcp_ports: &[u16]) -> ProbeResult<Arc<dyn Prober>> {
    match method {
        ProbeMethod::Icmp => Ok(Arc::new(IcmpProber::new()?)),
        ProbeMethod::Tcp => Ok(Arc::new(TcpProber::new(tcp_ports.to_vec())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Responds for a fixed set of octets; optionally stalls on others.
    struct MockProber {
        up: HashSet<u8>,
        stall: HashSet<u8>,
        fail: HashSet<u8>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockProber {
        fn new(up: &[u8]) -> Self {
            Self {
                up: up.iter().copied().collect(),
                stall: HashSet::new(),
                fail: HashSet::new(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for MockProber {
        fn method(&self) -> ProbeMethod {
            ProbeMethod::Icmp
        }

        fn requires_privileges(&self) -> bool {
            false
        }

        async fn probe(&self, ip: Ipv4Addr, _timeout: Duration) -> ProbeResult<ProbeOutcome> {
            let octet = ip.octets()[3];
            assert!((FIRST_HOST..=LAST_HOST).contains(&octet));
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if self.stall.contains(&octet) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            } else if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail.contains(&octet) {
                return Err(ProbeError::Other("boom".to_string()));
            }
            if self.up.contains(&octet) {
                Ok(ProbeOutcome::responded(Duration::from_millis(octet as u64)))
            } else {
                Ok(ProbeOutcome::silent())
            }
        }
    }

    fn subnet() -> SubnetIdentity {
        SubnetIdentity::from_address(Ipv4Addr::new(192, 168, 1, 50))
    }

    #[tokio::test]
    async fn test_sweep_marks_only_responders() {
        let mut mock = MockProber::new(&[1, 50, 253]);
        mock.stall = [7, 100, 200].into_iter().collect();
        let prober: Arc<dyn Prober> = Arc::new(mock);

        let config = SweepConfig::new().with_timeout(Duration::from_millis(50));
        let report = sweep(prober, &subnet(), &config).await;

        let up: Vec<u8> = report.reachability.reachable_octets().collect();
        assert_eq!(up, vec![1, 50, 253]);
        assert_eq!(report.responded, 3);
        assert_eq!(report.probed, HOST_COUNT);
        assert_eq!(report.skipped, 0);
        assert!(!report.reachability.is_reachable(0));
        assert!(!report.reachability.is_reachable(255));
        assert!(report.local_responded());

        assert_eq!(report.hosts.len(), 3);
        assert_eq!(report.hosts[1].address, Ipv4Addr::new(192, 168, 1, 50));
        assert_eq!(report.hosts[1].rtt_ms, Some(50.0));
    }

    #[tokio::test]
    async fn test_probe_errors_are_unreachable() {
        let mut mock = MockProber::new(&[10, 11]);
        mock.fail = [11, 12].into_iter().collect();
        let prober: Arc<dyn Prober> = Arc::new(mock);

        let report = sweep(prober, &subnet(), &SweepConfig::new()).await;

        assert_eq!(report.reachability.reachable_octets().collect::<Vec<_>>(), vec![10]);
        assert_eq!(report.errors, 2);
        assert_eq!(report.probed, HOST_COUNT);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let prober: Arc<dyn Prober> = Arc::new(MockProber::new(&[2, 3, 99, 254]));
        let config = SweepConfig::new();

        let first = sweep(Arc::clone(&prober), &subnet(), &config).await;
        let second = sweep(prober, &subnet(), &config).await;

        assert_eq!(first.reachability, second.reachability);
        assert_eq!(first.hosts, second.hosts);
    }

    #[tokio::test]
    async fn test_every_host_probed_once() {
        let mock = Arc::new(MockProber::new(&[]));
        let prober: Arc<dyn Prober> = mock.clone();

        let report = sweep(prober, &subnet(), &SweepConfig::new()).await;

        assert_eq!(mock.calls.load(Ordering::SeqCst), HOST_COUNT);
        assert_eq!(report.responded, 0);
        assert!(report.hosts.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut mock = MockProber::new(&[]);
        mock.delay = Duration::from_millis(5);
        let mock = Arc::new(mock);
        let prober: Arc<dyn Prober> = mock.clone();

        let config = SweepConfig::new().with_concurrency(8);
        sweep(prober, &subnet(), &config).await;

        let peak = mock.peak.load(Ordering::SeqCst);
        assert!(peak <= 8, "peak concurrency {} exceeded bound", peak);
        assert!(peak > 1, "probes never overlapped");
    }

    #[tokio::test]
    async fn test_deadline_records_remaining_as_unreachable() {
        let mut mock = MockProber::new(&(1..=254).collect::<Vec<u8>>());
        mock.delay = Duration::from_millis(20);
        let prober: Arc<dyn Prober> = Arc::new(mock);

        let config = SweepConfig::new()
            .with_concurrency(1)
            .with_timeout(Duration::from_millis(100))
            .with_deadline(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let report = sweep(prober, &subnet(), &config).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(report.skipped > 0);
        assert_eq!(report.probed + report.skipped, HOST_COUNT);
        assert_eq!(report.responded, report.probed);
        assert!(!report.reachability.is_reachable(254));
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let prober: Arc<dyn Prober> = Arc::new(MockProber::new(&[5]));
        let config = SweepConfig::new().with_concurrency(0);

        let report = sweep(prober, &subnet(), &config).await;
        assert_eq!(report.responded, 1);
    }

    #[test]
    fn test_create_tcp_prober() {
        let prober = create_prober(ProbeMethod::Tcp, DEFAULT_TCP_PORTS).unwrap();
        assert_eq!(prober.method(), ProbeMethod::Tcp);
        assert!(create_prober(ProbeMethod::Tcp, &[]).is_err());
    }
}
