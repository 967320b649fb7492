//! Condition variable implementation.
//!
//! This module provides a condition variable type that can be used for thread coordination.

use crate::MutexGuard;
use parking_lot;

/// A condition variable.
///
/// Condition variables represent the ability to block a thread such that
/// it consumes no CPU time while waiting for an event to occur. Unlike
/// `std::sync::Condvar`, this type does not implement poisoning.
///
/// # Examples
///
/// ```
/// use task_pool::{Mutex, Condvar};
/// use std::sync::Arc;
/// use std::thread;
///
/// let pair = Arc::new((Mutex::new(false), Condvar::new()));
/// let pair2 = Arc::clone(&pair);
///
/// // Spawn a thread that will signal the condition variable
/// thread::spawn(move || {
///     let (lock, cvar) = &*pair2;
///     let mut started = lock.lock();
///     *started = true;
///     // Signal that we're ready
///     cvar.notify_one();
/// });
///
/// // Wait for the thread to start up
/// let (lock, cvar) = &*pair;
/// let mut started = lock.lock();
/// while !*started {
///     cvar.wait(&mut started);
/// }
/// ```
#[derive(Debug, Default)]
pub struct Condvar {
    inner: parking_lot::Condvar,
}

impl Condvar {
    /// Creates a new condition variable.
    ///
    /// # Examples
    ///
    /// ```
    /// use task_pool::Condvar;
    ///
    /// let cvar = Condvar::new();
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self {
            inner: parking_lot::Condvar::new(),
        }
    }

    /// Blocks the current thread until this condition variable receives a notification.
    ///
    /// This function will atomically unlock the mutex specified by `guard` and block the
    /// current thread. This means that any calls to `notify_one` or `notify_all` which
    /// happen logically after the mutex is unlocked are candidates to wake this thread up.
    /// When this function call returns, the lock specified will have been re-acquired.
    ///
    /// # Examples
    ///
    /// ```
    /// use task_pool::{Mutex, Condvar};
    /// use std::sync::Arc;
    /// use std::thread;
    ///
    /// let pair = Arc::new((Mutex::new(false), Condvar::new()));
    /// let pair2 = Arc::clone(&pair);
    ///
    /// thread::spawn(move || {
    ///     let (lock, cvar) = &*pair2;
    ///     let mut ready = lock.lock();
    ///     *ready = true;
    ///     cvar.notify_one();
    /// });
    ///
    /// let (lock, cvar) = &*pair;
    /// let mut ready = lock.lock();
    /// while !*ready {
    ///     cvar.wait(&mut ready);
    /// }
    /// ```
    #[inline]
    pub fn wait<T>(&self, guard: &mut MutexGuard<'_, T>) {
        self.inner.wait(guard);
    }

    /// Blocks the current thread until this condition variable receives a notification
    /// and the provided condition is met.
    ///
    /// This function will atomically unlock the mutex and block the current thread until
    /// `condition` returns `false` after being called with the mutex guard.
    ///
    /// # Examples
    ///
    /// ```
    /// use task_pool::{Mutex, Condvar};
    /// use std::sync::Arc;
    /// use std::thread;
    ///
    /// let pair = Arc::new((Mutex::new(0), Condvar::new()));
    /// let pair2 = Arc::clone(&pair);
    ///
    /// thread::spawn(move || {
    ///     let (lock, cvar) = &*pair2;
    ///     let mut count = lock.lock();
    ///     *count = 10;
    ///     cvar.notify_one();
    /// });
    ///
    /// let (lock, cvar) = &*pair;
    /// let mut count = lock.lock();
    /// cvar.wait_while(&mut count, |c| *c < 10);
    /// assert_eq!(*count, 10);
    /// ```
    #[inline]
    pub fn wait_while<T, F>(&self, guard: &mut MutexGuard<'_, T>, condition: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        self.inner.wait_while(guard, condition);
    }

    /// Wakes up one blocked thread on this condvar.
    ///
    /// If there is a blocked thread on this condition variable, then it will be woken up.
    /// Calls to `notify_one` are not buffered in any way.
    ///
    /// # Examples
    ///
    /// ```
    /// use task_pool::{Mutex, Condvar};
    /// use std::sync::Arc;
    /// use std::thread;
    ///
    /// let pair = Arc::new((Mutex::new(false), Condvar::new()));
    /// let pair2 = Arc::clone(&pair);
    ///
    /// thread::spawn(move || {
    ///     let (lock, cvar) = &*pair2;
    ///     let mut started = lock.lock();
    ///     *started = true;
    ///     cvar.notify_one();
    /// });
    ///
    /// let (lock, cvar) = &*pair;
    /// let mut started = lock.lock();
    /// while !*started {
    ///     cvar.wait(&mut started);
    /// }
    /// ```
    #[inline]
    pub fn notify_one(&self) {
        self.inner.notify_one();
    }

    /// Wakes up all blocked threads on this condvar.
    ///
    /// This method will ensure that any current waiters on the condition variable are awoken.
    /// Calls to `notify_all` are not buffered in any way.
    ///
    /// # Examples
    ///
    /// ```
    /// use task_pool::{Mutex, Condvar};
    /// use std::sync::Arc;
    /// use std::thread;
    ///
    /// let pair = Arc::new((Mutex::new(false), Condvar::new()));
    /// let mut handles = vec![];
    ///
    /// for _ in 0..3 {
    ///     let pair = Arc::clone(&pair);
    ///     let handle = thread::spawn(move || {
    ///         let (lock, cvar) = &*pair;
    ///         let mut started = lock.lock();
    ///         while !*started {
    ///             cvar.wait(&mut started);
    ///         }
    ///     });
    ///     handles.push(handle);
    /// }
    ///
    /// // Let threads start
    /// std::thread::sleep(std::time::Duration::from_millis(10));
    ///
    /// // Wake them all up
    /// {
    ///     let (lock, cvar) = &*pair;
    ///     let mut started = lock.lock();
    ///     *started = true;
    ///     cvar.notify_all();
    /// }
    ///
    /// // Wait for all threads
    /// for handle in handles {
    ///     handle.join().unwrap();
    /// }
    /// ```
    #[inline]
    pub fn notify_all(&self) {
        self.inner.notify_all();
    }
}
