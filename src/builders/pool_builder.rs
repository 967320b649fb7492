//! Constructs one or more named [`TaskPool`]s from configuration.
//!
//! A `TaskPool` needs nothing but a validated [`PoolConfig`], so
//! `build_pools` here is just the multi-pool convenience on top of
//! [`TaskPool::new`].

use std::collections::HashMap;

use crate::config::PoolConfig;
use crate::core::error::AppResult;
use crate::core::scheduler::TaskPool;

/// Builds one [`TaskPool`] per entry in `configs`, keyed by the same name.
///
/// Each pool gets its own audit log file (per its `PoolConfig`) and its own
/// worker/controller threads; pools built this way share no state with one
/// another.
///
/// # Errors
/// Returns the first construction error encountered, tagged with the pool
/// name that failed.
pub fn build_pools(configs: &HashMap<String, PoolConfig>) -> AppResult<HashMap<String, TaskPool>> {
    let mut pools = HashMap::with_capacity(configs.len());
    for (name, config) in configs {
        let pool = TaskPool::new(config).map_err(|err| err.context(format!("building pool `{name}`")))?;
        pools.insert(name.clone(), pool);
    }
    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_pool_per_config_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut configs = HashMap::new();
        configs.insert(
            "primary".to_string(),
            PoolConfig { worker_count: 1, max_workers: 4, sample_interval_ms: 50, audit_log_path: dir.path().join("a.txt") },
        );
        configs.insert(
            "secondary".to_string(),
            PoolConfig { worker_count: 1, max_workers: 4, sample_interval_ms: 50, audit_log_path: dir.path().join("b.txt") },
        );

        let pools = build_pools(&configs).unwrap();
        assert_eq!(pools.len(), 2);
        assert!(pools.contains_key("primary"));
        assert!(pools.contains_key("secondary"));
    }
}
