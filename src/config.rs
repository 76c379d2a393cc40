//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.trendfeed/config.toml` (user)
//! 3. `/etc/trendfeed/config.toml` (system)
//!
//! When no file exists the defaults are used. Every key is optional:
//!
//! ```toml
//! [cache]
//! ttl_secs = 300
//! max_size = 100
//!
//! [fetch]
//! base_url = "https://trends.google.com"
//! timeout_secs = 30
//!
//! [batch]
//! sequential = false
//! max_concurrent = 10
//! delay_secs = 0.0
//! use_cache = true
//! show_progress = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::batch::{BatchOptions, DEFAULT_CONCURRENCY, ScheduleMode};
use crate::cache::{CacheConfig, DEFAULT_MAX_SIZE, DEFAULT_TTL};
use crate::fetch::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::{Result, TrendsError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub batch: BatchSection,
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Cache lifetime in seconds; 0 disables caching (default: 300).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Capacity in entries (default: 100).
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_size: default_max_size(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_max_size() -> usize {
    DEFAULT_MAX_SIZE
}

/// Transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSection {
    /// Base URL of the trends service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Batch defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSection {
    /// Fetch one key at a time instead of concurrently.
    #[serde(default)]
    pub sequential: bool,
    /// Concurrency ceiling (default: 10).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Minimum spacing between outbound calls in seconds (default: 0).
    #[serde(default)]
    pub delay_secs: f64,
    #[serde(default = "default_true")]
    pub use_cache: bool,
    #[serde(default)]
    pub show_progress: bool,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            sequential: false,
            max_concurrent: default_max_concurrent(),
            delay_secs: 0.0,
            use_cache: true,
            show_progress: false,
        }
    }
}

fn default_max_concurrent() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist; otherwise the first existing standard
    /// location is used, falling back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TrendsError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            TrendsError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(TrendsError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".trendfeed").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/trendfeed/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Reject values that deserialize but make no sense.
    pub fn validate(&self) -> Result<()> {
        self.batch_delay()?;
        if self.fetch.timeout_secs == 0 {
            return Err(TrendsError::Configuration(
                "fetch.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .ttl(Duration::from_secs(self.cache.ttl_secs))
            .max_size(self.cache.max_size)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    pub fn batch_options(&self) -> Result<BatchOptions> {
        let mode = if self.batch.sequential {
            ScheduleMode::Sequential
        } else {
            ScheduleMode::Concurrent
        };
        Ok(BatchOptions::new()
            .mode(mode)
            .concurrency(self.batch.max_concurrent)
            .delay(self.batch_delay()?)
            .use_cache(self.batch.use_cache)
            .show_progress(self.batch.show_progress))
    }

    fn batch_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.batch.delay_secs).map_err(|e| {
            TrendsError::Configuration(format!(
                "invalid batch.delay_secs {}: {e}",
                self.batch.delay_secs
            ))
        })
    }
}
