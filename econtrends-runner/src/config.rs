//! Pipeline configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) reproduces
//! the built-in setup: the public Series API, the four monthly series, start
//! date `2016-01`, and outputs under `data/` and `docs/assets/`.

use econtrends_core::domain::registry::builtin_entries;
use econtrends_core::domain::{
    parse_date, RegistryError, SeriesEntry, SeriesRegistry, SeriesSpec, REQUIRED_SERIES,
};
use econtrends_core::data::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_START: &str = "2016-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse config TOML: {0}")]
    Parse(String),

    #[error("invalid default_start '{0}' (expected YYYY-MM or YYYY-MM-DD)")]
    InvalidStartDate(String),

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("invalid series registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Everything a pipeline run needs besides the start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Series API endpoint.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Start date used when a run does not supply one.
    pub default_start: String,
    /// Raw series CSVs (`<name>.csv`).
    pub raw_dir: PathBuf,
    /// Derived indicator CSVs.
    pub processed_dir: PathBuf,
    /// Summary CSV consumed by the dashboard.
    pub docs_dir: PathBuf,
    /// Fetch registry entries concurrently (one task per series).
    pub parallel_fetch: bool,
    /// Ordered series registry. Tokens are checked by [`PipelineConfig::registry`].
    pub series: Vec<SeriesEntry>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_start: DEFAULT_START.to_string(),
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            docs_dir: PathBuf::from("docs/assets"),
            parallel_fetch: true,
            series: builtin_entries().iter().map(SeriesEntry::from).collect(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the start date, the timeout, and the registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if parse_date(&self.default_start).is_none() {
            return Err(ConfigError::InvalidStartDate(self.default_start.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.registry()?;
        Ok(())
    }

    /// The validated registry, guaranteed to hold every series the pipeline derives from.
    pub fn registry(&self) -> Result<SeriesRegistry, ConfigError> {
        let specs = self
            .series
            .iter()
            .map(SeriesEntry::resolve)
            .collect::<Result<Vec<SeriesSpec>, _>>()?;
        let registry = SeriesRegistry::new(specs)?;
        registry.require(&REQUIRED_SERIES)?;
        Ok(registry)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Re-root relative output directories under `root`. Absolute ones are kept.
    pub fn with_output_root(mut self, root: &Path) -> Self {
        self.raw_dir = root.join(&self.raw_dir);
        self.processed_dir = root.join(&self.processed_dir);
        self.docs_dir = root.join(&self.docs_dir);
        self
    }
}
