//! Tests for multi-pool construction

use std::collections::HashMap;

use task_pool::builders::build_pools;
use task_pool::config::PoolConfig;

#[test]
fn empty_config_map_builds_no_pools() {
    let configs = HashMap::new();
    let pools = build_pools(&configs).unwrap();
    assert!(pools.is_empty());
}

#[test]
fn each_built_pool_is_independently_usable() {
    let dir = tempfile::tempdir().unwrap();
    let mut configs = HashMap::new();
    configs.insert(
        "fast".to_string(),
        PoolConfig { worker_count: 2, max_workers: 4, sample_interval_ms: 50, audit_log_path: dir.path().join("fast.txt") },
    );
    configs.insert(
        "slow".to_string(),
        PoolConfig { worker_count: 1, max_workers: 2, sample_interval_ms: 50, audit_log_path: dir.path().join("slow.txt") },
    );

    let pools = build_pools(&configs).unwrap();
    assert_eq!(pools["fast"].active_worker_count(), 2);
    assert_eq!(pools["slow"].active_worker_count(), 1);

    pools["fast"].wait_until_drained();
    pools["slow"].wait_until_drained();
}

#[test]
fn invalid_config_fails_the_whole_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut configs = HashMap::new();
    configs.insert(
        "broken".to_string(),
        PoolConfig { worker_count: 0, max_workers: 4, sample_interval_ms: 50, audit_log_path: dir.path().join("broken.txt") },
    );

    assert!(build_pools(&configs).is_err());
}
