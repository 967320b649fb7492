//! `compute_primes N`, sieve of Eratosthenes up to `N`.

use std::io::Write;

use crate::core::error::TaskError;
use crate::core::scheduler::PoolHandle;
use crate::core::task::Task;
use crate::mutex::Mutex;

/// Finds every prime in `2..=n` and presents them space-separated.
///
/// The sieve runs in `execute`, not at construction time, so its cost
/// counts against the worker that dequeued it rather than the submitter.
pub struct ComputePrimes {
    n: u64,
    result: Mutex<Vec<u64>>,
}

impl ComputePrimes {
    /// Builds a task that sieves primes up to (and including) `n`.
    #[must_use]
    pub fn new(n: u64) -> Self {
        Self { n, result: Mutex::new(Vec::new()) }
    }

    fn sieve(n: u64) -> Vec<u64> {
        if n < 2 {
            return Vec::new();
        }
        let n = n as usize;
        let mut is_prime = vec![true; n + 1];
        is_prime[0] = false;
        is_prime[1] = false;
        let mut i = 2;
        while i * i <= n {
            if is_prime[i] {
                let mut j = i * i;
                while j <= n {
                    is_prime[j] = false;
                    j += i;
                }
            }
            i += 1;
        }
        (2..=n).filter(|&i| is_prime[i]).map(|i| i as u64).collect()
    }
}

impl Task for ComputePrimes {
    fn execute(&self, _pool: &PoolHandle) -> Result<(), TaskError> {
        *self.result.lock() = Self::sieve(self.n);
        Ok(())
    }

    fn present(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let primes = self.result.lock();
        let rendered: Vec<String> = primes.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", rendered.join(" "))
    }

    fn description(&self) -> String {
        format!("Created a list of prime numbers from 1 to {}", self.n)
    }
}
