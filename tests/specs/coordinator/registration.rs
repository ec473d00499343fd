//! Registration specs
//!
//! Workers get the lowest free slot as their identity; a full fleet
//! refuses with a distinct error code and closes the connection.

use crate::prelude::*;

#[tokio::test]
async fn workers_receive_lowest_free_slot() {
    let mut coordinator = start_coordinator(8, 5000).await;
    let addr = registration_addr(&coordinator);

    let (_first, ack) = connect_worker(addr).await;
    assert_eq!(ack, "0");
    let (_second, ack) = connect_worker(addr).await;
    assert_eq!(ack, "1");

    assert!(coordinator.registry().release(SlotId::new(0)));
    let (_third, ack) = connect_worker(addr).await;
    assert_eq!(ack, "0");

    assert_eq!(coordinator.registry().occupied_count(), 2);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn full_fleet_refuses_with_capacity_code() {
    let mut coordinator = start_coordinator(1, 5000).await;
    let addr = registration_addr(&coordinator);

    let (mut a, ack) = connect_worker(addr).await;
    assert_eq!(ack, "0");

    let (mut b, ack) = connect_worker(addr).await;
    assert_eq!(ack, "-1");
    assert!(closed_by_peer(&mut b).await);

    // A is untouched by B's refusal
    assert!(coordinator.registry().is_occupied(SlotId::new(0)));
    assert_eq!(coordinator.registry().occupied_count(), 1);
    a.write_all(b"0\n").await.unwrap();

    coordinator.shutdown().await;
}

#[tokio::test]
async fn freed_capacity_admits_next_worker() {
    let mut coordinator = start_coordinator(1, 5000).await;
    let addr = registration_addr(&coordinator);

    let (a, ack) = connect_worker(addr).await;
    assert_eq!(ack, "0");
    drop(a);

    let registry = std::sync::Arc::clone(coordinator.registry());
    assert!(eventually(|| registry.occupied_count() == 0).await);

    let (_b, ack) = connect_worker(addr).await;
    assert_eq!(ack, "0");
    coordinator.shutdown().await;
}

#[tokio::test]
async fn concurrent_registrations_get_distinct_identities() {
    let mut coordinator = start_coordinator(8, 5000).await;
    let addr = registration_addr(&coordinator);

    let joins: Vec<_> = (0..8)
        .map(|_| tokio::spawn(connect_worker(addr)))
        .collect();
    let mut workers = Vec::new();
    for join in joins {
        workers.push(join.await.unwrap());
    }

    let mut ids: Vec<usize> = workers
        .iter()
        .map(|(_, ack)| ack.parse().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..8).collect::<Vec<_>>());

    let (_late, ack) = connect_worker(addr).await;
    assert_eq!(ack, "-1");
    coordinator.shutdown().await;
}

#[tokio::test]
async fn shutdown_disconnects_registered_workers() {
    let mut coordinator = start_coordinator(2, 5000).await;
    let addr = registration_addr(&coordinator);
    let (mut worker, _) = connect_worker(addr).await;

    coordinator.shutdown().await;

    assert!(closed_by_peer(&mut worker).await);
    assert_eq!(coordinator.registry().occupied_count(), 0);
}
