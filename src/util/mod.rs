//! Small ambient helpers shared across the crate: wall-clock timestamps for
//! the audit log and developer-facing tracing setup.

pub mod clock;
pub mod telemetry;

pub use clock::{now_ms, Timestamp};
pub use telemetry::init_tracing;
