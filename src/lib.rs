//! # lanscout - Local Subnet Host Discovery
//!
//! lanscout finds the live hosts on the machine's own /24. Before probing
//! anything it establishes which subnet it is on by cross-checking three
//! independent sources, and refuses to sweep when they disagree or when the
//! network falls outside the allowed private range.
//!
//! ## Features
//!
//! - **Cross-checked identity**: primary interface address, outbound-route
//!   probe and hostname lookup must agree
//! - **Concurrent sweep**: bounded fan-out with per-probe timeout, optional
//!   whole-sweep deadline and rate limiting
//! - **Two probe methods**: ICMP echo, or TCP connect for unprivileged runs
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use lanscout::discovery::{DiscoveryContext, DiscoveryOptions, SystemIdentity, SystemInterfaces};
//! use lanscout::scanner::{create_prober, sweep, ProbeMethod, SweepConfig, DEFAULT_TCP_PORTS};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = DiscoveryContext::establish(
//!         &DiscoveryOptions::default(),
//!         &SystemInterfaces::new(),
//!         &SystemIdentity::default(),
//!     )
//!     .await?;
//!
//!     let prober = create_prober(ProbeMethod::Tcp, DEFAULT_TCP_PORTS)?;
//!     let report = sweep(prober, &ctx.subnet, &SweepConfig::new()).await;
//!
//!     for host in &report.hosts {
//!         println!("{} is up", host.address);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`discovery`] - Interface Inspector, Self-Identity Resolver and Subnet Validator
//! - [`scanner`] - Sweep engine and the `Prober` trait
//! - [`types`] - Subnet identity and reachability map
//! - [`config`] - Settings file handling
//! - [`error`] - Error types per layer
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use discovery::{DiscoveryContext, DiscoveryOptions};
pub use error::{CliError, DiscoveryError, ProbeError, ShapeViolation};
pub use scanner::{sweep, ProbeMethod, Prober, SweepConfig, SweepReport};
pub use types::{ReachabilityMap, SubnetIdentity};
