use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default refresh interval in milliseconds (15 minutes)
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 15 * 60 * 1000;

/// Delay between starting each feature version read (10ms)
pub const DEFAULT_STAGGER_DELAY_MS: u64 = 10;

// =============================================================================
// Release line constants
// =============================================================================

pub const DEFAULT_OLDEST_FEATURE_VERSION: u32 = 8;

pub const DEFAULT_NEWEST_FEATURE_VERSION: u32 = 25;

pub const DEFAULT_LTS_VERSIONS: &[u32] = &[8, 11, 17, 21, 25];

/// Index configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexConfig {
    pub refresh: RefreshConfig,
    /// Major versions read on every refresh cycle
    pub feature_versions: Vec<u32>,
    pub lts_versions: Vec<u32>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshConfig::default(),
            feature_versions: (DEFAULT_OLDEST_FEATURE_VERSION..=DEFAULT_NEWEST_FEATURE_VERSION)
                .collect(),
            lts_versions: DEFAULT_LTS_VERSIONS.to_vec(),
        }
    }
}

/// Refresh-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshConfig {
    pub interval_ms: u64,
    pub stagger_delay_ms: u64,
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            stagger_delay_ms: DEFAULT_STAGGER_DELAY_MS,
        }
    }
}

/// Returns the path to the data directory for release-index.
/// Uses $XDG_DATA_HOME/release-index if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-index,
/// or ./release-index if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("releases.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("release-index.log")
}

/// Returns the path to the optional configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-index")
}
