// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

/// Env var naming a YAML config file; the first CLI argument wins over it.
pub const CONFIG_ENV: &str = "EOLSCRAPER_CONFIG";

/// Everything a run needs, passed explicitly into the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Root that every relative `output_path` / `output_dir` is resolved against.
    pub output_dir: PathBuf,
    pub user_agent: String,
    /// Minimum gap between two consecutive network fetches.
    pub min_fetch_interval_ms: u64,
    pub chrome: Option<ChromeConfig>,
    pub firefox: Option<FirefoxConfig>,
    pub windows: Vec<WindowsFamily>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChromeConfig {
    /// Everything up to (not including) the platform segment.
    pub base_url: String,
    pub platform: String,
    pub channels: Vec<String>,
    pub output_path: PathBuf,
    /// Upper bound on `nextPageToken` hops per channel.
    pub max_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FirefoxConfig {
    pub source_url: String,
    pub output_path: PathBuf,
    pub eol_policy: CatalogEolPolicy,
}

/// How a catalog record's end-of-life is derived from later records.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEolPolicy {
    /// `major` records end at the next `major` record; others carry no EOL.
    #[default]
    NextMajor,
    /// Every record ends at the next record, whatever its category.
    NextRecord,
}

/// One OS release-health page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowsFamily {
    pub name: String,
    pub source_url: String,
    /// Prepended to the version slug to form the file name.
    pub output_prefix: String,
    #[serde(default = "default_windows_dir")]
    pub output_dir: PathBuf,
}

fn default_windows_dir() -> PathBuf {
    PathBuf::from("windows/versions")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            user_agent: "Mozilla/5.0".to_string(),
            min_fetch_interval_ms: 1_000,
            chrome: Some(ChromeConfig::default()),
            firefox: Some(FirefoxConfig::default()),
            windows: vec![
                WindowsFamily {
                    name: "windows11".into(),
                    source_url: "https://learn.microsoft.com/en-us/windows/release-health/windows11-release-information".into(),
                    output_prefix: "windows_11_".into(),
                    output_dir: default_windows_dir(),
                },
                WindowsFamily {
                    name: "windows10".into(),
                    source_url: "https://learn.microsoft.com/en-us/windows/release-health/release-information".into(),
                    output_prefix: "windows_10_".into(),
                    output_dir: default_windows_dir(),
                },
                WindowsFamily {
                    name: "windows_server".into(),
                    source_url: "https://learn.microsoft.com/en-us/windows/release-health/windows-server-release-info".into(),
                    output_prefix: "windows_server_".into(),
                    output_dir: default_windows_dir(),
                },
            ],
        }
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://versionhistory.googleapis.com/v1/chrome/platforms".into(),
            platform: "win".into(),
            channels: vec!["stable".into(), "extended".into()],
            output_path: PathBuf::from("chrome/versions/chrome_versions.json"),
            max_pages: 20,
        }
    }
}

impl Default for FirefoxConfig {
    fn default() -> Self {
        Self {
            source_url: "https://product-details.mozilla.org/1.0/firefox.json".into(),
            output_path: PathBuf::from("firefox/versions/firefox_versions.json"),
            eol_policy: CatalogEolPolicy::default(),
        }
    }
}

impl Config {
    /// Read a YAML config; keys it leaves out keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// First CLI argument, then `EOLSCRAPER_CONFIG`, then built-in defaults.
    pub fn from_env_or_default() -> Result<Self> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok());
        match path {
            Some(p) => {
                info!(path = %p, "loading config");
                Self::load(p)
            }
            None => {
                info!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn min_fetch_interval(&self) -> Duration {
        Duration::from_millis(self.min_fetch_interval_ms)
    }
}
