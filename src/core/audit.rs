//! The pool's audit log.
//!
//! `AuditSink` abstracts over where lifecycle events go, with a fixed event
//! vocabulary: startup, per-task completion, pause, resume, error,
//! deadlock-driven expansion, and shutdown. `record` takes `&self` rather
//! than `&mut self` here: the sink is shared across every worker thread
//! through `Arc<Inner>`, so the single-purpose log lock lives *inside* the
//! sink (a `Mutex<File>`) rather than around it.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::collections::VecDeque;

use crate::mutex::Mutex;
use crate::util::clock::Timestamp;

/// A lifecycle event worth recording in the audit trail.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// The pool finished constructing its initial worker set.
    Startup,
    /// A task ran to completion (success case).
    TaskCompleted {
        /// The task's description, as returned by `Task::description`.
        description: String,
        /// Wall-clock time `execute` began.
        start: Timestamp,
        /// Wall-clock time `execute` returned.
        end: Timestamp,
    },
    /// `pause()` was called.
    Paused,
    /// `resume()` was called.
    Resumed,
    /// A task's `execute` returned an error.
    Error {
        /// The task id that failed.
        task_id: u64,
        /// `TaskError::to_string()` of the failure.
        info: String,
    },
    /// The controller detected a stall and grew the worker set.
    Deadlock {
        /// Worker count observed before expansion.
        old_worker_count: usize,
    },
    /// The controller detected a stall but could not expand (`MAX_WORKERS`
    /// already reached).
    ExpansionRefused {
        /// The configured ceiling that blocked expansion.
        max_workers: usize,
    },
    /// `shutdown()` completed.
    Shutdown,
}

/// Where audit events go. Implementations must serialize concurrent
/// `record` calls themselves (the "log lock" in the concurrency model lives
/// inside the sink, not around it).
pub trait AuditSink: Send + Sync {
    /// Records one event. Must not panic; a logging failure should never
    /// take down a worker thread.
    fn record(&self, event: &AuditEvent);

    /// Enables or disables recording without dropping the sink. Matches
    /// `TaskPool::set_logging`. Sinks with no on/off concept (e.g. the
    /// in-memory sink used in tests) may leave this a no-op.
    fn set_enabled(&self, _enabled: bool) {}
}

/// Append-only text sink matching the original server's log format:
/// `HH:MM:SS, DD.MM.YY`, local time, one blank line between entries. The
/// file is truncated on construction, matching "first write truncates."
pub struct FileAuditLog {
    file: Mutex<File>,
    enabled: AtomicBool,
}

impl FileAuditLog {
    /// Creates (truncating) the log file at `path` and writes the startup
    /// line immediately.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        writeln!(file, "Server start working; time: {}\n", Timestamp::now().format())?;
        Ok(Self { file: Mutex::new(file), enabled: AtomicBool::new(true) })
    }

}

impl AuditSink for FileAuditLog {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn record(&self, event: &AuditEvent) {
        if !self.enabled.load(Ordering::Acquire) {
            return;
        }
        let mut file = self.file.lock();
        let now = Timestamp::now().format();
        let _ = match event {
            AuditEvent::Startup => Ok(()),
            AuditEvent::TaskCompleted { description, start, end } => {
                let duration = start.elapsed_secs_until(*end);
                writeln!(
                    file,
                    "Solved task with description:\n{description}Start working: {}\nEnd working: {}\nDuration: {duration} sec\n",
                    start.format(),
                    end.format(),
                )
            }
            AuditEvent::Paused => writeln!(file, "The server has been suspended: {now}\n"),
            AuditEvent::Resumed => writeln!(file, "The server operation has been resumed: {now}\n"),
            AuditEvent::Error { task_id, info } => {
                writeln!(file, "An error has occurred in task {task_id}: {info}\nTime: {now}\n")
            }
            AuditEvent::Deadlock { old_worker_count } => writeln!(
                file,
                "Deadlock has occurred, a new thread has been created\nCurrent number of threads - {old_worker_count}, new number of threads - {}\nTime: {now}\n",
                old_worker_count + 1,
            ),
            AuditEvent::ExpansionRefused { max_workers } => writeln!(
                file,
                "Deadlock has occurred but the pool is already at its maximum of {max_workers} threads\nTime: {now}\n",
            ),
            AuditEvent::Shutdown => writeln!(file, "Server end working; time: {now}\n"),
        };
    }
}

/// Bounded ring buffer of events, kept for tests that assert on event
/// ordering without touching the filesystem.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Creates a sink retaining at most `max_events` most-recent events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self { events: Mutex::new(VecDeque::with_capacity(max_events)), max_events }
    }

    /// Snapshot of currently retained events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}
