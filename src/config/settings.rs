//! Application settings and paths.
//!
//! Settings live in an XDG-compliant config directory as JSON. Every field
//! has a default, so a missing or partial file is valid.

use crate::discovery::{InterfaceNames, TieBreak};
use crate::error::{ConfigError, ConfigResult};
use crate::scanner::ProbeMethod;
use directories::ProjectDirs;
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/lanscout)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the configuration directory for the current user.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "lanscout", "lanscout")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Interface names treated as the primary adapter.
    pub primary_interfaces: Vec<String>,
    /// Interface names treated as loopback.
    pub loopback_interfaces: Vec<String>,
    /// How to choose among several primary addresses.
    pub tie_break: TieBreak,
    /// Destination used by the outbound-route probe. Nothing is sent to it.
    pub route_target: SocketAddr,
    /// Range the validated subnet must fall in.
    pub allowed_range: String,
    /// Reachability probe used by the sweep.
    pub probe_method: ProbeMethod,
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum concurrent probes.
    pub concurrency: usize,
    /// Whole-sweep deadline in milliseconds, 0 for none.
    pub deadline_ms: u64,
    /// Maximum probes per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Ports tried by the TCP prober.
    pub tcp_ports: Vec<u16>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            primary_interfaces: vec!["en0".to_string(), "eth0".to_string()],
            loopback_interfaces: vec!["lo0".to_string(), "lo".to_string()],
            tie_break: TieBreak::First,
            route_target: SocketAddr::from(([8, 8, 8, 8], 80)),
            allowed_range: "192.168.0.0/16".to_string(),
            probe_method: ProbeMethod::Icmp,
            timeout_ms: 50,
            concurrency: 32,
            deadline_ms: 0,
            rate_limit: 0,
            tcp_ports: vec![22, 80, 443, 445],
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::discover()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` if given, otherwise from the default location.
    pub fn resolve(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidFormat(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidFormat(
                "timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.probe_method == ProbeMethod::Tcp && self.tcp_ports.is_empty() {
            return Err(ConfigError::InvalidFormat(
                "tcp_ports cannot be empty for the tcp probe method".to_string(),
            ));
        }
        if !self.route_target.is_ipv4() {
            return Err(ConfigError::InvalidFormat(format!(
                "route_target must be an IPv4 address, got {}",
                self.route_target
            )));
        }
        self.allowed_range()?;
        Ok(())
    }

    /// Parsed `allowed_range`.
    pub fn allowed_range(&self) -> ConfigResult<Ipv4Network> {
        self.allowed_range.parse().map_err(|_| {
            ConfigError::InvalidFormat(format!("invalid allowed_range: {}", self.allowed_range))
        })
    }

    pub fn interface_names(&self) -> InterfaceNames {
        InterfaceNames {
            primary: self.primary_interfaces.clone(),
            loopback: self.loopback_interfaces.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_ms > 0).then(|| Duration::from_millis(self.deadline_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.timeout_ms, 50);
        assert_eq!(settings.concurrency, 32);
        assert_eq!(settings.deadline(), None);
        assert_eq!(
            settings.allowed_range().unwrap(),
            "192.168.0.0/16".parse::<Ipv4Network>().unwrap()
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.concurrency, settings.concurrency);
        assert_eq!(parsed.route_target, settings.route_target);
        assert_eq!(parsed.tie_break, settings.tie_break);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "primary_interfaces": ["wlan0"], "deadline_ms": 2000 }"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.primary_interfaces, vec!["wlan0"]);
        assert_eq!(settings.deadline(), Some(Duration::from_secs(2)));
        assert_eq!(settings.timeout_ms, 50);
    }

    #[test]
    fn test_write_then_resolve() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = AppSettings {
            tie_break: TieBreak::MostSpecific,
            ..AppSettings::default()
        };

        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded = AppSettings::resolve(Some(&path)).unwrap();
        assert_eq!(loaded.tie_break, TieBreak::MostSpecific);
    }

    #[test]
    fn test_ipv6_route_target_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{ "route_target": "[2001:4860:4860::8888]:80" }"#).unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));

        fs::write(&path, r#"{ "route_target": "1.1.1.1:53" }"#).unwrap();
        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.route_target, SocketAddr::from(([1, 1, 1, 1], 53)));
    }

    #[test]
    fn test_probe_method_aliases_in_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{ "probe_method": "ping" }"#).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap().probe_method, ProbeMethod::Icmp);

        fs::write(&path, r#"{ "probe_method": "connect" }"#).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap().probe_method, ProbeMethod::Tcp);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{ "concurrency": 0 }"#).unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));

        fs::write(&path, r#"{ "allowed_range": "not-a-cidr" }"#).unwrap();
        assert!(AppSettings::load_from(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = AppSettings::load_from(Path::new("/nonexistent/lanscout/settings.json"));
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }
}
