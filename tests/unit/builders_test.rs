//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use prometheus_pending::builders::ManagerBuilder;
use prometheus_pending::config::{LimitConfig, ManagerConfig};
use prometheus_pending::core::{InMemorySink, Strategy, TelemetryKind, TelemetrySink};
use prometheus_pending::runtime::TokioSpawner;

#[test]
fn test_manager_builder_defaults() {
    let builder = ManagerBuilder::default();
    assert_eq!(builder.limit(), None);
}

#[test]
fn test_manager_builder_with_limit() {
    let builder = ManagerBuilder::new().with_limit(2, Strategy::Drop);
    assert_eq!(builder.limit(), Some((2, Strategy::Drop)));
}

#[test]
fn test_manager_builder_from_config() {
    let cfg = ManagerConfig {
        limit: Some(LimitConfig {
            max_concurrent: 5,
            strategy: Strategy::Block,
        }),
    };
    let builder = ManagerBuilder::from_config(&cfg).unwrap();
    assert_eq!(builder.limit(), Some((5, Strategy::Block)));
}

#[tokio::test]
async fn test_built_manager_exposes_gate() {
    let mgr = ManagerBuilder::new()
        .with_limit(3, Strategy::Drop)
        .build()
        .unwrap();
    assert_eq!(mgr.gate().max_concurrent(), Some(3));
    assert_eq!(mgr.gate().strategy(), Some(Strategy::Drop));
    assert_eq!(mgr.gate().available(), Some(3));
    assert!(!mgr.is_closed());
}

#[tokio::test]
async fn test_optional_sink_receives_events() {
    let sink = Arc::new(InMemorySink::new(16));
    let shared: Arc<dyn TelemetrySink> = sink.clone();
    let mgr = ManagerBuilder::new()
        .with_optional_sink(Some(shared))
        .build()
        .unwrap();

    mgr.schedule("job", Duration::from_secs(60), |_| async {});
    mgr.cancel("job");

    assert_eq!(sink.count(TelemetryKind::Scheduled, "job"), 1);
    assert_eq!(sink.count(TelemetryKind::Cancelled, "job"), 1);
}

#[test]
fn test_build_with_explicit_spawner() {
    let runtime = TokioSpawner::with_worker_threads(1).unwrap();
    let handle = runtime.handle().clone();
    let mgr = ManagerBuilder::new().build_with_spawner(TokioSpawner::new(handle.clone()));

    let (tx, rx) = std::sync::mpsc::channel();
    mgr.schedule("owned", Duration::from_millis(1), move |_| async move {
        let _ = tx.send(());
    });
    rx.recv_timeout(Duration::from_secs(2)).unwrap();

    handle
        .block_on(mgr.shutdown(Duration::from_secs(1)))
        .unwrap();
    drop(mgr);
    drop(runtime);
}

#[tokio::test]
async fn test_absent_optional_sink_keeps_configured_sink() {
    let sink = Arc::new(InMemorySink::new(16));
    let mgr = ManagerBuilder::new()
        .with_sink(Arc::clone(&sink))
        .with_optional_sink(None)
        .build()
        .unwrap();

    mgr.schedule("kept", Duration::from_secs(60), |_| async {});
    mgr.cancel("kept");

    assert_eq!(sink.count(TelemetryKind::Scheduled, "kept"), 1);
    assert_eq!(sink.count(TelemetryKind::Cancelled, "kept"), 1);
}

#[test]
fn test_owned_runtime_dropped_with_running_body() {
    let sink = Arc::new(InMemorySink::new(16));
    let spawner = TokioSpawner::with_worker_threads(1).unwrap();
    let mgr = ManagerBuilder::new()
        .with_sink(Arc::clone(&sink))
        .build_with_spawner(spawner);

    let (tx, rx) = std::sync::mpsc::channel();
    mgr.schedule("running", Duration::ZERO, move |_| async move {
        let _ = tx.send(());
        tokio::time::sleep(Duration::from_millis(50)).await;
    });
    rx.recv_timeout(Duration::from_secs(2)).unwrap();

    // Shuts the owned runtime down on this thread; its tasks are released.
    drop(mgr);
    assert_eq!(Arc::strong_count(&sink), 1);
}

#[test]
fn test_owned_runtime_dropped_with_pending_timer() {
    let sink = Arc::new(InMemorySink::new(16));
    let spawner = TokioSpawner::with_worker_threads(1).unwrap();
    let mgr = ManagerBuilder::new()
        .with_sink(Arc::clone(&sink))
        .build_with_spawner(spawner);

    mgr.schedule("pending", Duration::from_secs(3600), |_| async {});
    let clone = mgr.clone();
    drop(mgr);
    assert!(clone.is_pending("pending"));

    drop(clone);
    assert_eq!(Arc::strong_count(&sink), 1);
}
