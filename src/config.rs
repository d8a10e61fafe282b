use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::update::error::ConfigError;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default interval between re-checks while an update is pending (5 minutes)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Delay before showing the update notification, so it does not race the UI mount (2 seconds)
pub const DEFAULT_NOTIFY_DELAY_MS: u64 = 2_000;

/// Timeout for the manifest request in milliseconds (10 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// Host-related constants
// =============================================================================

/// Default manifest location
pub const DEFAULT_MANIFEST_URL: &str = "https://xiaolongmr.github.io/imgtops/manifest.json";

/// Environment variable the host publishes its running version in
pub const DEFAULT_VERSION_ENV: &str = "PANEL_PLUGIN_VERSION";

/// Update checker configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    pub manifest_url: String,
    /// Re-check interval in milliseconds
    pub poll_interval_ms: u64,
    /// Notification delay in milliseconds
    pub notify_delay_ms: u64,
    /// Manifest request timeout in milliseconds
    pub fetch_timeout_ms: u64,
    /// Environment variable holding the running version
    pub version_env: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            notify_delay_ms: DEFAULT_NOTIFY_DELAY_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            version_env: DEFAULT_VERSION_ENV.to_string(),
        }
    }
}

impl CheckerConfig {
    /// Load a JSON config file. Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn notify_delay(&self) -> Duration {
        Duration::from_millis(self.notify_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Returns the path to the data directory for panel-update-check.
/// Uses $XDG_DATA_HOME/panel-update-check if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/panel-update-check,
/// or ./panel-update-check if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("panel-update-check.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("panel-update-check")
}
