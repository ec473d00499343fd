//! Liveness specs
//!
//! Silent workers are evicted once the timeout is exceeded and not
//! before; disconnected workers are evicted on the next sweep.

use crate::prelude::*;
use std::sync::Arc;
use tokio::time::Instant;

#[tokio::test]
async fn silent_worker_is_evicted_after_timeout() {
    let mut coordinator = start_coordinator(4, 300).await;
    let registry = Arc::clone(coordinator.registry());
    let addr = registration_addr(&coordinator);

    let started = Instant::now();
    let (mut worker, ack) = connect_worker(addr).await;
    assert_eq!(ack, "0");

    assert!(eventually(|| !registry.is_occupied(SlotId::new(0))).await);
    assert!(started.elapsed() >= Duration::from_millis(300));

    // eviction is silent: the worker just sees its connection close
    assert!(closed_by_peer(&mut worker).await);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn worker_survives_well_inside_timeout() {
    let mut coordinator = start_coordinator(4, 2000).await;
    let addr = registration_addr(&coordinator);
    let (_worker, _) = connect_worker(addr).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(coordinator.registry().is_occupied(SlotId::new(0)));
    coordinator.shutdown().await;
}

#[tokio::test]
async fn any_bytes_keep_a_worker_alive() {
    let mut coordinator = start_coordinator(4, 300).await;
    let addr = registration_addr(&coordinator);
    let (mut worker, _) = connect_worker(addr).await;

    for _ in 0..15 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        worker.write_all(b"0\n").await.unwrap();
    }

    assert!(coordinator.registry().is_occupied(SlotId::new(0)));
    coordinator.shutdown().await;
}

#[tokio::test]
async fn disconnected_worker_is_evicted_without_waiting_for_timeout() {
    let mut coordinator = start_coordinator(4, 60_000).await;
    let registry = Arc::clone(coordinator.registry());
    let addr = registration_addr(&coordinator);

    let (worker, _) = connect_worker(addr).await;
    let (_other, _) = connect_worker(addr).await;
    drop(worker);

    let started = Instant::now();
    assert!(eventually(|| !registry.is_occupied(SlotId::new(0))).await);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(registry.is_occupied(SlotId::new(1)));
    coordinator.shutdown().await;
}
