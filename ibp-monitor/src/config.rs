//! Monitor configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ibp_beacon::BeaconRegistry;
use ibp_rig::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT, MAX_READ_TIMEOUT};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "ibp-monitor";
const CONFIG_FILE: &str = "config.json";

/// Validate a scan dwell given in seconds
pub fn parse_scan_delay(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("scan delay must be a non-negative number of seconds, got {}", secs))
}

/// Settings read from `config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Serial port path
    pub port: Option<String>,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Slot display refresh
    pub poll_interval_ms: u64,
    /// Dwell per frequency during a scan
    pub scan_delay_secs: f64,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: Option<String>,
    /// Replacement beacon table: slot number -> `callsign, city, country, grid`
    pub beacons: Option<BTreeMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            poll_interval_ms: 250,
            scan_delay_secs: 2.0,
            log_level: None,
            beacons: None,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/ibp-monitor`, falling back to `~/.config/ibp-monitor`
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join(APP_DIR));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join(APP_DIR))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing file gives the defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        Self::from_json(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        parse_scan_delay(config.scan_delay_secs).context("invalid scan_delay_secs")?;
        if config.read_timeout() > MAX_READ_TIMEOUT {
            anyhow::bail!(
                "read_timeout_ms must be at most {}",
                MAX_READ_TIMEOUT.as_millis()
            );
        }
        if config.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than zero");
        }
        Ok(config)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Dwell per frequency; zero if the field was changed to an invalid value after loading
    pub fn scan_delay(&self) -> Duration {
        parse_scan_delay(self.scan_delay_secs).unwrap_or_default()
    }

    /// Beacon table from the config, or the built-in NCDXF table
    pub fn registry(&self) -> Result<BeaconRegistry> {
        let Some(beacons) = &self.beacons else {
            return Ok(BeaconRegistry::ncdxf());
        };

        let mut lines = Vec::with_capacity(beacons.len());
        for (key, line) in beacons {
            let slot: usize = key
                .trim()
                .parse()
                .with_context(|| format!("beacon slot '{}' is not a number", key))?;
            lines.push((slot, line.as_str()));
        }
        BeaconRegistry::from_lines(lines).context("invalid beacon table in config")
    }
}
