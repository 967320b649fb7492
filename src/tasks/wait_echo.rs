//! `wait_echo SECONDS MESSAGE`, blocks the worker for `SECONDS`, then
//! presents `MESSAGE`.

use std::io::Write;
use std::time::Duration;

use crate::core::error::TaskError;
use crate::core::scheduler::PoolHandle;
use crate::core::task::Task;

/// Sleeps the dequeuing worker for `seconds`, then renders `message`.
pub struct WaitEcho {
    seconds: u64,
    message: String,
}

impl WaitEcho {
    /// Builds a task that sleeps `seconds` seconds before presenting
    /// `message`.
    #[must_use]
    pub fn new(seconds: u64, message: impl Into<String>) -> Self {
        Self { seconds, message: message.into() }
    }
}

impl Task for WaitEcho {
    fn execute(&self, _pool: &PoolHandle) -> Result<(), TaskError> {
        std::thread::sleep(Duration::from_secs(self.seconds));
        Ok(())
    }

    fn present(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "[Waited {}s] with message: \"{}\"", self.seconds, self.message)
    }

    fn description(&self) -> String {
        format!("[Waited {}s] with message: \"{}\"", self.seconds, self.message)
    }
}
