//! Application configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Directory name under the platform config/data directories.
const APP_DIR: &str = "acctkeep";

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.json";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "acctkeep=info,acctkeep_core=info";

/// Settings loaded from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the storage files.
    pub data_dir: PathBuf,
    /// Storage slot for the account list.
    pub storage_key: String,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: acctkeep_core::DEFAULT_KEY.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

/// Default location of `config.json`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
