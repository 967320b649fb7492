//! `sort_random N`, in-memory sort of `N` random 16-bit integers.

use std::io::Write;

use rand::Rng;

use crate::core::error::TaskError;
use crate::core::scheduler::PoolHandle;
use crate::core::task::Task;
use crate::mutex::Mutex;

/// Generates `n` random `i16`s and sorts them in memory.
pub struct SortRandom {
    n: usize,
    result: Mutex<Vec<i16>>,
}

impl SortRandom {
    /// Builds a task that generates and sorts `n` random `i16`s.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n, result: Mutex::new(Vec::new()) }
    }
}

impl Task for SortRandom {
    fn execute(&self, _pool: &PoolHandle) -> Result<(), TaskError> {
        let mut rng = rand::rng();
        let mut arr: Vec<i16> = (0..self.n).map(|_| rng.random()).collect();
        arr.sort_unstable();
        *self.result.lock() = arr;
        Ok(())
    }

    fn present(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let arr = self.result.lock();
        let rendered: Vec<String> = arr.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", rendered.join(" "))
    }

    fn description(&self) -> String {
        format!("Created and sorted array of {} elements", self.n)
    }
}
