//! Tests for error types

use task_pool::core::error::{ConfigError, PoolError, TaskError};

#[test]
fn task_error_failed_renders_reason() {
    let err = TaskError::Failed { reason: "boom".into() };
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn pool_error_unknown_task_id_renders_id() {
    let err = PoolError::UnknownTaskId(42);
    assert_eq!(err.to_string(), "unknown task id: 42");
}

#[test]
fn pool_error_max_workers_reached_renders_max() {
    let err = PoolError::MaxWorkersReached { max: 100 };
    assert_eq!(err.to_string(), "cannot expand pool past the maximum of 100 workers");
}

#[test]
fn config_error_zero_workers_message() {
    let err = ConfigError::ZeroWorkers;
    assert_eq!(err.to_string(), "worker_count must be at least 1");
}

#[test]
fn config_error_invalid_json_wraps_serde_error() {
    let parse_err = serde_json::from_str::<task_pool::config::PoolConfig>("{not json").unwrap_err();
    let err: ConfigError = parse_err.into();
    assert!(matches!(err, ConfigError::InvalidJson(_)));
}
