//! Tests for telemetry sinks and tracing setup

use std::sync::Arc;
use std::time::Duration;

use prometheus_pending::core::{
    build_telemetry_event, InMemorySink, SchedulerError, TelemetryKind, TelemetrySink, TracingSink,
};
use prometheus_pending::util::{init_tracing, now_ms};

#[test]
fn test_build_telemetry_event() {
    let before = now_ms();
    let event = build_telemetry_event(
        TelemetryKind::Failed,
        "task-1",
        None,
        Some(SchedulerError::Dropped),
    );
    assert_eq!(event.kind, TelemetryKind::Failed);
    assert_eq!(event.task_id, "task-1");
    assert_eq!(event.error, Some(SchedulerError::Dropped));
    assert!(event.created_at_ms >= before);
}

#[test]
fn test_shared_sink_through_arc() {
    let sink = Arc::new(InMemorySink::default());
    let dyn_sink: Arc<dyn TelemetrySink> = sink.clone();

    dyn_sink.on_scheduled("a", Duration::from_millis(3));
    dyn_sink.on_executed("a", Duration::from_millis(1));

    assert_eq!(sink.count(TelemetryKind::Scheduled, "a"), 1);
    assert_eq!(sink.events_of(TelemetryKind::Executed).len(), 1);
}

#[test]
fn test_zero_capacity_sink_records_nothing() {
    let sink = InMemorySink::new(0);
    sink.on_cancelled("a");
    assert!(sink.events().is_empty());
}

#[test]
fn test_tracing_sink_with_subscriber() {
    init_tracing();
    init_tracing();

    let sink = TracingSink;
    sink.on_scheduled("traced", Duration::from_millis(10));
    sink.on_rescheduled("traced");
    sink.on_executed("traced", Duration::from_millis(2));
    sink.on_cancelled("traced");
    sink.on_failed("traced", &SchedulerError::Dropped);
}
