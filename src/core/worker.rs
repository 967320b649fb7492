//! The worker loop: one OS thread dequeuing and running tasks.
//!
//! Uses the same lock+condvar "no-polling" wait pattern throughout this
//! crate: workers park on a condvar when the queue is empty rather than
//! spinning, and `join_with_timeout` gives shutdown a bounded wait instead
//! of an unbounded `JoinHandle::join`.

use std::cell::RefCell;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::scheduler::{Inner, PoolHandle};
use crate::util::clock::Timestamp;

thread_local! {
    /// The waiting flag of whichever `Worker` owns the current thread, set
    /// at the top of `worker_loop`. `set_current_worker_waiting` looks here
    /// rather than scanning a worker table by thread id, the Rust-idiomatic
    /// replacement for the original's linear `thread::id` scan.
    static CURRENT_WAITING: RefCell<Option<Arc<AtomicBool>>> = const { RefCell::new(None) };
}

/// Flips the waiting flag of the worker running on the *calling* thread, if
/// any, keeping `Inner::waiting_count` in lockstep. A no-op when called from
/// a thread that isn't a pool worker (e.g. a unit test calling it directly).
pub(crate) fn set_current_waiting(inner: &Inner, flag: bool) {
    CURRENT_WAITING.with(|cell| {
        let Some(waiting) = cell.borrow().clone() else { return };
        let previous = waiting.swap(flag, Ordering::AcqRel);
        if flag && !previous {
            inner.waiting_count.fetch_add(1, Ordering::AcqRel);
        } else if !flag && previous {
            inner.waiting_count.fetch_sub(1, Ordering::AcqRel);
        }
    });
}

/// A thread dedicated to the pool's dispatch loop.
///
/// The two flags the controller needs (`running`: inside `execute`;
/// `waiting`: blocked on a pool-internal condition via
/// `set_current_worker_waiting`) are not kept on `Worker` itself. Nothing
/// ever needs to read a *specific* worker's flag, only the pool-wide sum,
/// so each flag lives only as a thread-local (see `CURRENT_WAITING` above)
/// plus the running tally in `Inner::running_count`/`Inner::waiting_count`,
/// which `working_count`/`waiting_count` read directly. That tally is kept
/// in lockstep with the per-thread flags at every flip, so it is exactly
/// the sum spec'd, maintained incrementally instead of re-summed on every
/// read, which also keeps the controller's sampling lock-free.
pub(crate) struct Worker {
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a worker thread running `worker_loop` against `inner`.
    pub(crate) fn spawn(id: usize, inner: Arc<Inner>) -> io::Result<Worker> {
        let running = Arc::new(AtomicBool::new(false));
        let waiting = Arc::new(AtomicBool::new(false));
        let handle = thread::Builder::new()
            .name(format!("task-pool-worker-{id}"))
            .spawn(move || worker_loop(inner, running, waiting))?;
        Ok(Worker { handle: Some(handle) })
    }

    /// Joins with a bounded per-worker timeout. Returns `false` (and
    /// detaches the thread) on timeout rather than blocking shutdown
    /// indefinitely.
    pub(crate) fn join_with_timeout(mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else { return true };
        let (tx, rx) = mpsc::channel();
        let joiner = thread::spawn(move || {
            let _ = handle.join();
            let _ = tx.send(());
        });
        match rx.recv_timeout(timeout) {
            Ok(()) => {
                let _ = joiner.join();
                true
            }
            Err(_) => false,
        }
    }
}

fn worker_loop(inner: Arc<Inner>, running: Arc<AtomicBool>, waiting: Arc<AtomicBool>) {
    CURRENT_WAITING.with(|cell| *cell.borrow_mut() = Some(waiting.clone()));

    loop {
        let queued = {
            let mut submission = inner.submission.lock();
            inner.tasks_available.wait_while(&mut submission, |state| {
                let dispatchable = !state.queue.is_empty() && !inner.paused.load(Ordering::Acquire);
                !dispatchable && !inner.shutdown.load(Ordering::Acquire)
            });
            let dispatchable = !submission.queue.is_empty() && !inner.paused.load(Ordering::Acquire);
            if !dispatchable {
                None
            } else {
                submission.queue.pop_front()
            }
        };

        let Some(queued) = queued else {
            break;
        };

        running.store(true, Ordering::Release);
        inner.running_count.fetch_add(1, Ordering::AcqRel);

        let start = Timestamp::now();
        let handle = PoolHandle::from_inner(inner.clone());
        let body = queued.body.clone();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| body.execute(&handle)));
        let end = Timestamp::now();

        running.store(false, Ordering::Release);
        inner.running_count.fetch_sub(1, Ordering::AcqRel);

        match outcome {
            Ok(Ok(())) => {
                inner.record_completion(queued.id, queued.body, start, end);
            }
            Ok(Err(err)) => {
                inner.record_failure(queued.id, &err.to_string());
            }
            Err(_panic) => {
                // Non-standard failure (a panic rather than a returned
                // `TaskError`): the catch-all classification for task-body
                // failures whose kind the pool cannot name up front.
                inner.record_failure(queued.id, &format!("Unknown error in task id: {}", queued.id));
            }
        }

        inner.notify_drain();
    }

    CURRENT_WAITING.with(|cell| *cell.borrow_mut() = None);
}
