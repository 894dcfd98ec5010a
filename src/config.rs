//! Configuration file and environment overrides
//!
//! Config lives at `<config_home>/marketdash/config.toml` unless a path is
//! given explicitly. A missing file means defaults; a malformed file is an
//! error.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DashboardError, Result};

pub const DATA_DIR_ENV: &str = "MARKETDASH_DATA_DIR";
pub const BASE_URL_ENV: &str = "MARKETDASH_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; marketdash/0.1)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub data_dir: Option<PathBuf>,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Yahoo,
            data_dir: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows of the data dump
    pub table_rows: usize,
    /// Columns of the line chart
    pub chart_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            table_rows: 10,
            chart_width: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("marketdash").join("config.toml"))
    }

    /// Load from `path` (or the default location), then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(DashboardError::Config(format!(
                        "config file {} does not exist",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.exists()),
        };

        let mut config = match path {
            Some(p) => {
                debug!("Loading config from {}", p.display());
                let text = fs::read_to_string(&p)?;
                Self::from_toml(&text)
                    .map_err(|e| DashboardError::Config(format!("{}: {}", p.display(), e)))?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.use_data_dir(PathBuf::from(dir));
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.source.base_url = url;
        }
    }

    /// Switch to the offline CSV source on `dir`
    pub fn use_data_dir(&mut self, dir: PathBuf) {
        self.source.kind = SourceKind::Csv;
        self.source.data_dir = Some(dir);
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.kind == SourceKind::Csv && self.source.data_dir.is_none() {
            return Err(DashboardError::Config(
                "source.kind = \"csv\" needs source.data_dir".to_string(),
            ));
        }
        if self.source.timeout_secs == 0 {
            return Err(DashboardError::Config(
                "source.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.display.chart_width < 2 {
            return Err(DashboardError::Config(
                "display.chart_width must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
