//! Pool configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

/// Configuration a [`crate::core::scheduler::TaskPool`] is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of worker threads started at construction.
    pub worker_count: usize,
    /// Hard cap on worker count the controller will never exceed
    /// (`MAX_WORKERS` in the original design; defaults to 100 there).
    pub max_workers: usize,
    /// Controller sampling interval, in milliseconds (100 in the original).
    pub sample_interval_ms: u64,
    /// Path to the audit log file, truncated on pool construction.
    pub audit_log_path: PathBuf,
}

impl Default for PoolConfig {
    /// `worker_count` defaults to the number of logical CPUs.
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            max_workers: 100,
            sample_interval_ms: 100,
            audit_log_path: PathBuf::from("../log_file.txt"),
        }
    }
}

impl PoolConfig {
    /// Validates configured values before a pool is built from them.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] describing the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.max_workers < self.worker_count {
            return Err(ConfigError::MaxBelowInitial { max_workers: self.max_workers, worker_count: self.worker_count });
        }
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroSampleInterval);
        }
        Ok(())
    }

    /// Parses and validates configuration from a JSON string.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the JSON fails to parse or deserialize,
    /// or if the resulting configuration fails [`PoolConfig::validate`].
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PoolConfig {
        PoolConfig { worker_count: 4, max_workers: 16, sample_interval_ms: 100, audit_log_path: "log.txt".into() }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(PoolConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let mut config = base();
        config.worker_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWorkers)));
    }

    #[test]
    fn max_below_initial_is_rejected() {
        let mut config = base();
        config.max_workers = 1;
        assert!(matches!(config.validate(), Err(ConfigError::MaxBelowInitial { .. })));
    }

    #[test]
    fn zero_sample_interval_is_rejected() {
        let mut config = base();
        config.sample_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSampleInterval)));
    }

    #[test]
    fn from_json_str_parses_and_validates() {
        let json = r#"{"worker_count":2,"max_workers":10,"sample_interval_ms":100,"audit_log_path":"log.txt"}"#;
        let config = PoolConfig::from_json_str(json).unwrap();
        assert_eq!(config.worker_count, 2);
    }

    #[test]
    fn from_json_str_rejects_invalid_config() {
        let json = r#"{"worker_count":0,"max_workers":10,"sample_interval_ms":100,"audit_log_path":"log.txt"}"#;
        assert!(PoolConfig::from_json_str(json).is_err());
    }
}
