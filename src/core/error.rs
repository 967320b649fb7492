//! Error types for the task pool.
//!
//! `TaskError` is what a task's own body returns; `PoolError` covers
//! failures in pool operations themselves (submission past shutdown,
//! unknown task ids); `ConfigError` covers invalid [`crate::config::PoolConfig`]
//! values. `AppResult` is the top-level alias the REPL binary uses.

use thiserror::Error;

/// Error returned by [`crate::core::task::Task::execute`].
///
/// This is the Rust rendering of "the task raised an error" from the
/// original design, where a task's worker thread could throw an arbitrary
/// `std::exception` (or something not derived from it at all).
#[derive(Debug, Error)]
pub enum TaskError {
    /// The task's own logic failed; `reason` is shown to the operator via
    /// `result <id>` and recorded in the audit log.
    #[error("{reason}")]
    Failed {
        /// Human-readable description of what went wrong.
        reason: String,
    },
    /// A task tried to submit a sub-task or call back into the pool after
    /// the pool had already begun shutting down.
    #[error("pool is shutting down")]
    PoolShuttingDown,
    /// I/O failure from a task body (file tasks read/write local state).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by [`crate::core::scheduler::TaskPool`] operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// `submit` was called after `shutdown()` had already been initiated.
    #[error("task pool is shutting down, submission rejected")]
    ShuttingDown,
    /// `await_result_by_id`/`result` was called with a task id that was
    /// never issued by this pool (`id == 0` or `id > last_task_id`).
    #[error("unknown task id: {0}")]
    UnknownTaskId(u64),
    /// The worker count cannot be expanded further; `MAX_WORKERS` reached.
    #[error("cannot expand pool past the maximum of {max} workers")]
    MaxWorkersReached {
        /// The configured ceiling that was hit.
        max: usize,
    },
}

/// Error returned by [`crate::config::PoolConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `worker_count` was zero; the pool requires at least one worker.
    #[error("worker_count must be at least 1")]
    ZeroWorkers,
    /// `max_workers` was smaller than `worker_count`.
    #[error("max_workers ({max_workers}) must be >= worker_count ({worker_count})")]
    MaxBelowInitial {
        /// Configured ceiling.
        max_workers: usize,
        /// Configured starting worker count.
        worker_count: usize,
    },
    /// `sample_interval_ms` was zero; the controller would spin.
    #[error("sample_interval_ms must be at least 1")]
    ZeroSampleInterval,
    /// The supplied JSON failed to parse as a `PoolConfig`.
    #[error("invalid configuration JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Top-level error alias for the REPL binary and other application-level
/// call sites.
pub type AppResult<T> = anyhow::Result<T>;
