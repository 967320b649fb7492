//! The deadlock-sensing supervisor.
//!
//! A task's `execute` may submit sub-tasks and then block waiting for them
//! (re-entrant submission). If every worker is simultaneously blocked this
//! way, no worker remains free to run the sub-tasks, the pool stalls
//! itself. This controller watches for exactly that condition and responds
//! by growing the worker set, bounded by `PoolConfig::max_workers`.
//!
//! Sampling reads only the two aggregate atomics on `Inner`
//! (`active_worker_count`, `waiting_count`), no data lock is ever
//! acquired while sampling, so the controller can never contend with, or be
//! blocked by, dispatch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::audit::AuditEvent;
use crate::core::scheduler::Inner;

pub(crate) struct Controller {
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Controller {
    /// Spawns the supervisor thread, sampling every `sample_interval`.
    pub(crate) fn spawn(inner: Arc<Inner>, sample_interval: Duration) -> Controller {
        let stopped = Arc::new(AtomicBool::new(false));
        let stopped_for_thread = stopped.clone();
        let handle = thread::Builder::new()
            .name("task-pool-controller".to_string())
            .spawn(move || monitor(&inner, &stopped_for_thread, sample_interval))
            .expect("failed to spawn controller thread");
        Controller { stopped, handle: Some(handle) }
    }

    /// Signals the supervisor to stop and joins it. Used by
    /// `TaskPool::shutdown` for bounded, graceful teardown.
    pub(crate) fn stop_and_join(mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Signals the supervisor to stop without joining it, mirroring
    /// `TaskPool`'s non-blocking `Drop`.
    pub(crate) fn stop_detached(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.handle.take();
    }
}

fn monitor(inner: &Arc<Inner>, stopped: &Arc<AtomicBool>, sample_interval: Duration) {
    while !stopped.load(Ordering::Acquire) {
        thread::sleep(sample_interval);
        if stopped.load(Ordering::Acquire) {
            break;
        }

        let active = inner.active_worker_count();
        let waiting = inner.waiting_count();
        if active == waiting && active > 0 {
            match inner.expand() {
                Ok(()) => inner.audit.record(&AuditEvent::Deadlock { old_worker_count: active }),
                Err(_) => {
                    // expand() already logged ExpansionRefused for the
                    // cap-reached case; a transient spawn failure is logged
                    // there too and simply retried on the next tick.
                }
            }
        }
    }
}
