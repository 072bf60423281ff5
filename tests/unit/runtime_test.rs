//! Tests for tokio spawner utilities

use std::time::Duration;

use prometheus_pending::core::Spawn;
use prometheus_pending::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_abort() {
    let spawner = TokioSpawner::current().unwrap();
    assert!(!spawner.owns_runtime());

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = spawner.spawn(async move {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        let _ = tx.send(());
    });
    handle.abort();

    // The sender is dropped with the aborted future.
    assert!(rx.await.is_err());
}

#[test]
fn test_default_threads_runtime() {
    let spawner = TokioSpawner::with_default_threads().unwrap();
    assert!(spawner.owns_runtime());
}
