//! TOML configuration file loading
//!
//! Handles discovery of the default config file, parsing, and validation of
//! the queue and scheduler settings. Every field has a serde default so an
//! empty file (or no file at all) yields a working configuration.

use crate::core::error_handling::ContextualError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ConfigError::Parse { .. } | ConfigError::Invalid { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message, .. } | ConfigError::Invalid { message } => Some(message),
            ConfigError::Read { .. } => None,
        }
    }
}

/// Settings applied to queues built from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Maximum committed plus reserved elements; negative means unbounded
    ///
    /// Default: -1
    #[serde(default = "default_capacity")]
    pub capacity: i64,

    /// Upper bound on how long `dequeue` may wait for an element
    ///
    /// Default: 0 (never wait)
    #[serde(default)]
    pub dequeue_timeout_ms: u64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            dequeue_timeout_ms: 0,
        }
    }
}

impl QueueSettings {
    /// Capacity as a bound, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        usize::try_from(self.capacity).ok().filter(|c| *c > 0)
    }

    pub fn dequeue_timeout(&self) -> Duration {
        Duration::from_millis(self.dequeue_timeout_ms)
    }

    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_dequeue_timeout(mut self, timeout: Duration) -> Self {
        self.dequeue_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

/// Scheduler and worker-pool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Poll interval of the scheduling loop
    ///
    /// Default: 1000ms
    #[serde(default = "default_sleep_time_ms")]
    pub sleep_time_ms: u64,

    /// Bound on joins performed by deregister and dispose
    ///
    /// Default: 1000ms
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,

    /// How long the pool waits for a free worker before reporting exhaustion
    ///
    /// Default: 250ms
    #[serde(default = "default_block_timeout_ms")]
    pub block_timeout_ms: u64,

    /// Worker threads per available processor
    ///
    /// Default: 2
    #[serde(default = "default_threads_per_processor")]
    pub threads_per_processor: usize,

    /// Explicit worker count; 0 derives it from processors
    ///
    /// Default: 0
    #[serde(default)]
    pub pool_size: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            sleep_time_ms: default_sleep_time_ms(),
            join_timeout_ms: default_join_timeout_ms(),
            block_timeout_ms: default_block_timeout_ms(),
            threads_per_processor: default_threads_per_processor(),
            pool_size: 0,
        }
    }
}

impl SchedulerSettings {
    /// Worker threads for the pool: `pool_size` if set, otherwise
    /// processors × `threads_per_processor`
    pub fn worker_count(&self) -> usize {
        if self.pool_size > 0 {
            self.pool_size
        } else {
            num_cpus::get().max(1) * self.threads_per_processor.max(1)
        }
    }
}

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SedaConfig {
    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

impl SedaConfig {
    /// Location checked when no config file is given explicitly
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Seda").join("seda.toml"))
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load an explicit file, else the default file if it exists, else defaults
    ///
    /// An explicitly named file must exist.
    pub fn discover(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        match config_file {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => {
                    log::trace!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };

        if self.queue.capacity == 0 {
            return invalid("queue.capacity must be positive, or negative for unbounded");
        }
        if self.scheduler.sleep_time_ms == 0 {
            return invalid("scheduler.sleep_time_ms must be > 0");
        }
        if self.scheduler.threads_per_processor == 0 {
            return invalid("scheduler.threads_per_processor must be > 0");
        }
        Ok(())
    }
}

// Default functions for serde
fn default_capacity() -> i64 {
    -1
}

fn default_sleep_time_ms() -> u64 {
    1000
}

fn default_join_timeout_ms() -> u64 {
    1000
}

fn default_block_timeout_ms() -> u64 {
    250
}

fn default_threads_per_processor() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = write_config("");
        let config = SedaConfig::load(file.path()).unwrap();

        assert_eq!(config, SedaConfig::default());
        assert_eq!(config.queue.capacity(), None);
        assert_eq!(config.scheduler.sleep_time_ms, 1000);
        assert_eq!(config.scheduler.threads_per_processor, 2);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let file = write_config(
            r#"
            [queue]
            capacity = 64

            [scheduler]
            sleep_time_ms = 10
            "#,
        );
        let config = SedaConfig::load(file.path()).unwrap();

        assert_eq!(config.queue.capacity(), Some(64));
        assert_eq!(config.queue.dequeue_timeout(), Duration::ZERO);
        assert_eq!(config.scheduler.sleep_time_ms, 10);
        assert_eq!(config.scheduler.join_timeout_ms, 1000);
    }

    #[test]
    fn test_zero_capacity_is_invalid() {
        let file = write_config("[queue]\ncapacity = 0\n");
        let err = SedaConfig::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.is_user_actionable());
        assert!(err.user_message().unwrap().contains("queue.capacity"));
    }

    #[test]
    fn test_zero_poll_interval_is_invalid() {
        let config = SedaConfig {
            scheduler: SchedulerSettings {
                sleep_time_ms: 0,
                ..SchedulerSettings::default()
            },
            ..SedaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_reports_parse_error() {
        let file = write_config("[queue\ncapacity = ");
        let err = SedaConfig::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("Error parsing configuration file"));
    }

    #[test]
    fn test_missing_explicit_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = SedaConfig::discover(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(!err.is_user_actionable());
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_worker_count_policies() {
        let derived = SchedulerSettings::default();
        assert_eq!(derived.worker_count(), num_cpus::get() * 2);

        let explicit = SchedulerSettings {
            pool_size: 5,
            ..SchedulerSettings::default()
        };
        assert_eq!(explicit.worker_count(), 5);
    }

    #[test]
    fn test_negative_capacity_means_unbounded() {
        let settings = QueueSettings::default().with_capacity(-5);
        assert_eq!(settings.capacity(), None);

        let settings = settings
            .with_capacity(3)
            .with_dequeue_timeout(Duration::from_millis(20));
        assert_eq!(settings.capacity(), Some(3));
        assert_eq!(settings.dequeue_timeout_ms, 20);
    }
}
