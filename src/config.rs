use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SeoError};
use crate::rules::RuleThresholds;
use crate::tracker::CompletionModel;

/// Global seocheck configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Rule thresholds. Leave unset to use the standard values.
    #[serde(default)]
    pub rules: RuleThresholds,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,
}

/// How pages are fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL of a running `seocheck serve` proxy (e.g., "http://127.0.0.1:8080").
    /// When unset, pages are fetched directly.
    #[serde(default)]
    pub proxy_url: Option<String>,
}

/// The CORS proxy server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Competitive snapshot behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Simulated provider latency in milliseconds
    #[serde(default = "default_snapshot_delay")]
    pub delay_ms: u64,

    /// How long to wait for the snapshot after findings are shown
    #[serde(default = "default_snapshot_wait")]
    pub wait_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub model: CompletionModel,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; seocheck/{}; +https://crates.io/crates/seocheck)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_snapshot_delay() -> u64 {
    1500
}

fn default_snapshot_wait() -> u64 {
    5
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            proxy_url: None,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: default_snapshot_delay(),
            wait_secs: default_snapshot_wait(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            log::debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SeoError::ConfigError(e.to_string()))
    }

    /// Get the config file path
    ///
    /// Supports SEOCHECK_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("SEOCHECK_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "seocheck")
            .ok_or_else(|| SeoError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
