//! Tests for the audit log sinks

use task_pool::core::audit::{AuditEvent, AuditSink, FileAuditLog, InMemoryAuditSink};

#[test]
fn in_memory_sink_retains_bounded_history() {
    let sink = InMemoryAuditSink::new(2);
    sink.record(&AuditEvent::Paused);
    sink.record(&AuditEvent::Resumed);
    sink.record(&AuditEvent::Shutdown);

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], AuditEvent::Resumed));
    assert!(matches!(events[1], AuditEvent::Shutdown));
}

#[test]
fn file_sink_truncates_on_construction_and_logs_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");

    {
        let log = FileAuditLog::new(&path).unwrap();
        log.record(&AuditEvent::Paused);
        log.record(&AuditEvent::Resumed);
    }
    let first_pass = std::fs::read_to_string(&path).unwrap();
    assert!(first_pass.contains("suspended"));
    assert!(first_pass.contains("resumed"));

    // Reopening the same path truncates rather than appending.
    let log = FileAuditLog::new(&path).unwrap();
    log.record(&AuditEvent::Shutdown);
    let second_pass = std::fs::read_to_string(&path).unwrap();
    assert!(!second_pass.contains("suspended"));
    assert!(second_pass.contains("Server end working"));
}

#[test]
fn disabled_sink_drops_subsequent_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    let log = FileAuditLog::new(&path).unwrap();
    log.set_enabled(false);
    log.record(&AuditEvent::Error { task_id: 7, info: "oops".into() });
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("oops"));
}

#[test]
fn deadlock_event_mentions_worker_count_transition() {
    let sink = InMemoryAuditSink::new(4);
    sink.record(&AuditEvent::Deadlock { old_worker_count: 3 });
    let events = sink.events();
    assert!(matches!(events[0], AuditEvent::Deadlock { old_worker_count: 3 }));
}
