//! Settings file management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::RoadError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::storage::layout::DEFAULT_SNAPSHOT_DIR;

/// Environment variable overriding the settings file location
pub const SETTINGS_PATH_ENV: &str = "ROADCTL_SETTINGS";

/// roadctl settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,

    /// Cloudflare API configuration
    #[serde(default)]
    pub cloudflare: CloudflareSettings,

    /// TTL applied to every A record written
    #[serde(default = "default_dns_ttl")]
    pub dns_ttl: u32,

    /// Directory holding the genesis snapshot
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Optional JSON file with extra deployment targets
    #[serde(default)]
    pub targets_file: Option<PathBuf>,
}

fn default_dns_ttl() -> u32 {
    // Cloudflare "automatic"
    1
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_DIR)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            cloudflare: CloudflareSettings::default(),
            dns_ttl: default_dns_ttl(),
            snapshot_dir: default_snapshot_dir(),
            targets_file: None,
        }
    }
}

impl Settings {
    /// Load settings from `file`, falling back to defaults when it does not exist
    pub async fn load(file: &File) -> Result<Self, RoadError> {
        match file.read_json_opt::<Settings>().await {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => {
                debug!("No settings file at {}, using defaults", file.path().display());
                Ok(Settings::default())
            }
            Err(e) => Err(RoadError::ConfigError(format!(
                "unable to read settings file {}: {}",
                file.path().display(),
                e
            ))),
        }
    }
}

/// Cloudflare API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareSettings {
    /// Base URL for the Cloudflare v4 API
    #[serde(default = "default_cloudflare_url")]
    pub base_url: String,
}

fn default_cloudflare_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

impl Default for CloudflareSettings {
    fn default() -> Self {
        Self {
            base_url: default_cloudflare_url(),
        }
    }
}
