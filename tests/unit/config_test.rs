//! Tests for pool configuration loading

use task_pool::config::PoolConfig;
use task_pool::core::error::ConfigError;

#[test]
fn default_config_passes_validation() {
    let config = PoolConfig::default();
    assert!(config.validate().is_ok());
    assert!(config.worker_count >= 1);
    assert_eq!(config.max_workers, 100);
}

#[test]
fn max_workers_below_worker_count_is_rejected() {
    let config = PoolConfig { worker_count: 8, max_workers: 4, sample_interval_ms: 100, audit_log_path: "log.txt".into() };
    assert!(matches!(config.validate(), Err(ConfigError::MaxBelowInitial { max_workers: 4, worker_count: 8 })));
}

#[test]
fn round_trips_through_json() {
    let config = PoolConfig { worker_count: 3, max_workers: 20, sample_interval_ms: 250, audit_log_path: "audit.txt".into() };
    let json = serde_json::to_string(&config).unwrap();
    let parsed = PoolConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed.worker_count, config.worker_count);
    assert_eq!(parsed.max_workers, config.max_workers);
    assert_eq!(parsed.sample_interval_ms, config.sample_interval_ms);
}

#[test]
fn malformed_json_reports_invalid_json() {
    let err = PoolConfig::from_json_str("{ this is not json").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidJson(_)));
}

#[test]
fn zero_sample_interval_fails_validation_after_parsing() {
    let json = r#"{"worker_count":2,"max_workers":10,"sample_interval_ms":0,"audit_log_path":"log.txt"}"#;
    let err = PoolConfig::from_json_str(json).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroSampleInterval));
}
