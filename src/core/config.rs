//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::ingest::{Layout, Sources};
use crate::core::store::RetryPolicy;

/// File name of the project-level configuration
pub const PROJECT_CONFIG_FILE: &str = "authorlist.yaml";

/// Collaboration name used in XML output when none is configured
pub const DEFAULT_COLLABORATION: &str = "CTA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

/// Retry settings for the storage collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub max_tries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

/// Author list configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the source tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Source table names, relative to `data_dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Sources>,

    /// Column layout of each source table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    /// Person ids of corresponding authors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub corresponding: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Collaboration name for XML output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<String>,

    /// Where authors can request corrections; adds a section to LaTeX output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrections_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreSettings>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order.
    ///
    /// Implicit layers that are missing are skipped. Any file that exists,
    /// and an explicitly requested one, must read and parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Global user config (~/.config/authorlist/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_optional(&global_path)? {
                config.merge(global);
            }
        }

        // Project config (explicit path, else ./authorlist.yaml)
        match explicit {
            Some(path) => config.merge(Self::read(path)?),
            None => {
                if let Some(project) = Self::read_optional(Path::new(PROJECT_CONFIG_FILE))? {
                    config.merge(project);
                }
            }
        }

        // Environment variables
        if let Ok(title) = std::env::var("AUTHORLIST_TITLE") {
            config.title = Some(title);
        }
        if let Ok(data_dir) = std::env::var("AUTHORLIST_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(data_dir));
        }

        Ok(config)
    }

    /// Parse a configuration file
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from YAML text
    pub fn parse(contents: &str) -> Result<Self, serde_yml::Error> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    /// Parse a configuration file that may be absent; a file that exists
    /// must read and parse
    fn read_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "authorlist")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.sources.is_some() {
            self.sources = other.sources;
        }
        if other.layout.is_some() {
            self.layout = other.layout;
        }
        if !other.corresponding.is_empty() {
            self.corresponding = other.corresponding;
        }
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.collaboration.is_some() {
            self.collaboration = other.collaboration;
        }
        if other.corrections_url.is_some() {
            self.corrections_url = other.corrections_url;
        }
        if let Some(store) = other.store {
            let current = self.store.get_or_insert_with(StoreSettings::default);
            if store.max_tries.is_some() {
                current.max_tries = store.max_tries;
            }
            if store.base_delay_ms.is_some() {
                current.base_delay_ms = store.base_delay_ms;
            }
            if store.max_delay_ms.is_some() {
                current.max_delay_ms = store.max_delay_ms;
            }
        }
    }

    /// Directory holding the source tables, defaulting to the working directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn sources(&self) -> Sources {
        self.sources.clone().unwrap_or_default()
    }

    pub fn layout(&self) -> Layout {
        self.layout.clone().unwrap_or_default()
    }

    pub fn collaboration(&self) -> String {
        self.collaboration
            .clone()
            .unwrap_or_else(|| DEFAULT_COLLABORATION.to_string())
    }

    /// Backoff policy for storage operations
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(store) = &self.store {
            if let Some(max_tries) = store.max_tries {
                policy.max_tries = max_tries.max(1);
            }
            if let Some(ms) = store.base_delay_ms {
                policy.base_delay = Duration::from_millis(ms);
            }
            if let Some(ms) = store.max_delay_ms {
                policy.max_delay = Duration::from_millis(ms);
            }
        }
        policy
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yml::Error> {
        serde_yml::to_string(self)
    }
}
