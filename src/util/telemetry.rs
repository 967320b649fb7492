//! Developer-facing structured logging, independent of the user-facing
//! [`crate::core::audit::AuditLog`].

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a default env-filtered `tracing` subscriber if one hasn't
/// already been installed by the embedding application.
///
/// Safe to call more than once; only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}
