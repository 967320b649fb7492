//! The `Task` abstraction: the unit of work the pool schedules.
//!
//! Concrete task bodies live in [`crate::tasks`]; this module only defines
//! the trait and the bookkeeping types the scheduler attaches to every
//! submitted task.

use std::fmt;
use std::io::Write;

use crate::core::error::TaskError;
use crate::core::scheduler::PoolHandle;

/// Numeric identifier assigned to a task at submission time.
///
/// Ids are handed out from a monotonically increasing counter starting at
/// 1; `0` is never issued and is used by callers to mean "no such task".
pub type TaskId = u64;

/// Lifecycle state of a submitted task, tracked by the scheduler rather
/// than the task body itself.
///
/// A task that fails never becomes `Completed`; its id is recorded in the
/// pool's error set instead, rather than a third status variant, matching
/// the two-state model of the pool's data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Enqueued or currently running; no result yet available.
    Awaiting,
    /// `execute` returned `Ok(())`; the task is in the completion table.
    Completed,
}

/// A unit of work the pool can run.
///
/// Implementors provide `execute` (the computation) and `present` (how to
/// render the result to an operator). `execute` receives a [`PoolHandle`]
/// rather than storing one, so a task may submit further tasks and block on
/// their completion (re-entrant submission) without holding a reference to
/// the pool across its own lifetime, the handle is only valid for the
/// duration of the call.
///
/// Task bodies must be `Send + Sync`: `execute` runs on a worker thread,
/// `present` is later invoked from whichever thread calls
/// `TaskPool::await_result_by_id`, which need not be the same thread.
/// Internal mutable state (e.g. a computed result awaiting presentation)
/// must therefore use interior mutability ([`crate::Mutex`] or an atomic),
/// not `&mut self`.
pub trait Task: Send + Sync {
    /// Runs the task's computation. May submit sub-tasks through `pool` and
    /// block (via `pool.set_current_worker_waiting`) until they complete.
    fn execute(&self, pool: &PoolHandle) -> Result<(), TaskError>;

    /// Renders the task's result to `out`. Called at most once, from the
    /// thread that requested the result via `result <id>`, never from a
    /// worker thread. May read from stdin for an interactive follow-up
    /// (`search_in_file` does this), which is why `present` is documented
    /// as submitter-thread-only and always called under the console lock.
    fn present(&self, out: &mut dyn Write) -> std::io::Result<()>;

    /// Short human-readable description used for audit-log entries, e.g.
    /// `"Created and sorted array of 100 elements"`.
    fn description(&self) -> String;
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("description", &self.description()).finish()
    }
}
