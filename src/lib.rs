//! # task_pool
//!
//! An interactive, in-process task-execution server: a bounded pool of
//! worker threads that runs user-submitted jobs concurrently and returns
//! their results on demand by numeric id.
//!
//! ## Core problem solved
//!
//! A task's `execute` may itself submit further tasks and then block until
//! they complete (re-entrant submission, an external-memory sort
//! submitting per-chunk sort sub-tasks is the flagship example). If every
//! worker ends up blocked this way at once, the pool deadlocks: no worker
//! is free to run the sub-tasks the blocked workers are waiting on. The
//! [`core::controller`] watches for exactly that condition and grows the
//! worker set, bounded by [`config::PoolConfig::max_workers`].
//!
//! ## Key pieces
//!
//! - [`core::scheduler::TaskPool`], the submission queue, completion
//!   table, error set, and lifecycle controls (`pause`/`resume`/
//!   `wait_until_drained`/`shutdown`).
//! - [`core::task::Task`], the `execute`/`present` capability every
//!   submitted job implements.
//! - [`core::controller`], the deadlock-sensing supervisor thread.
//! - [`core::audit::AuditLog`], the append-only, human-readable lifecycle
//!   record.
//! - [`tasks`], the concrete job bodies the command line submits
//!   (`compute_primes`, `sort_random`, `wait_echo`, `sort_big_vec`,
//!   `search_in_file`).
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use task_pool::config::PoolConfig;
//! use task_pool::core::scheduler::TaskPool;
//! use task_pool::tasks::ComputePrimes;
//! use std::sync::Arc;
//!
//! let config = PoolConfig { audit_log_path: "log_file.txt".into(), ..PoolConfig::default() };
//! let pool = TaskPool::new(&config).unwrap();
//! let id = pool.submit(Arc::new(ComputePrimes::new(30))).unwrap();
//! pool.wait_until_drained();
//! let mut out = Vec::new();
//! pool.await_result_by_id(id, &mut out);
//! ```
//!
//! For a full worked example, see `src/bin/task_pool_server.rs`, the
//! command-line front end this crate ships alongside the pool.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: the pool, the worker loop, the controller,
/// the task trait, the audit log, and the error taxonomy.
pub mod core;
/// Configuration for building a [`core::scheduler::TaskPool`].
pub mod config;
/// Construction helpers for building one or more pools from configuration.
pub mod builders;
/// Concrete task bodies submitted from the command line.
pub mod tasks;
/// Shared utilities: wall-clock timestamps and developer-facing tracing.
pub mod util;

/// Condition variable built on `parking_lot`, used by the scheduler's
/// dispatch and drain waits.
pub mod condvar;
/// Mutex built on `parking_lot`, used throughout [`core`] for the
/// single-purpose locks the concurrency model calls for.
pub mod mutex;

pub use condvar::Condvar;
pub use mutex::{MappedMutexGuard, Mutex, MutexGuard};
