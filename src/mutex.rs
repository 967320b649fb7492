//! Mutex implementation
//!
//! This module provides a high-performance mutual exclusion primitive built on top of
//! the battle-tested `parking_lot` crate.
//!
//! # Features
//!
//! - Fair lock acquisition
//! - No poisoning on panic
//! - Compact memory footprint
//! - Fast lock/unlock operations
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```
//! use task_pool::Mutex;
//!
//! let mutex = Mutex::new(0);
//! *mutex.lock() = 10;
//! assert_eq!(*mutex.lock(), 10);
//! ```
//!
//! Concurrent access:
//!
//! ```
//! use task_pool::Mutex;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let mutex = Arc::new(Mutex::new(0));
//! let mut handles = vec![];
//!
//! for _ in 0..10 {
//!     let mutex = Arc::clone(&mutex);
//!     handles.push(thread::spawn(move || {
//!         let mut num = mutex.lock();
//!         *num += 1;
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(*mutex.lock(), 10);
//! ```

// Re-export parking_lot's Mutex types
pub use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
