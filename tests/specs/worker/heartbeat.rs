//! Worker agent specs against a real coordinator

use crate::prelude::*;
use std::sync::Arc;

#[tokio::test]
async fn heartbeating_agent_outlives_the_timeout() {
    let mut coordinator = start_coordinator(4, 300).await;
    let registry = Arc::clone(coordinator.registry());
    let addr = registration_addr(&coordinator);

    let mut agent = Agent::new(agent_config(addr, 50));
    let id = agent.register().await.unwrap();
    assert_eq!(id, SlotId::new(0));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let heartbeats = tokio::spawn(async move {
        let stats = agent
            .run_heartbeats(async {
                let _ = stop_rx.await;
            })
            .await
            .unwrap();
        agent.shutdown().await;
        stats
    });

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(registry.is_occupied(id));

    stop_tx.send(()).unwrap();
    let stats = heartbeats.await.unwrap();
    assert!(stats.sent >= 10, "{stats:?}");
    assert_eq!(stats.failed, 0);

    // the agent closed its end, so the slot frees on the next sweep
    assert!(eventually(|| !registry.is_occupied(id)).await);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn agent_is_refused_by_full_fleet() {
    let mut coordinator = start_coordinator(1, 5000).await;
    let addr = registration_addr(&coordinator);
    let (_occupant, _) = connect_worker(addr).await;

    let mut agent = Agent::new(agent_config(addr, 50));
    assert!(matches!(
        agent.register().await,
        Err(AgentError::Refused { code: -1 })
    ));
    assert_eq!(agent.state(), AgentState::ShutDown);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn silent_agent_is_evicted() {
    let mut coordinator = start_coordinator(4, 200).await;
    let registry = Arc::clone(coordinator.registry());
    let addr = registration_addr(&coordinator);

    // registered but never heartbeats
    let mut agent = Agent::new(agent_config(addr, 50));
    let id = agent.register().await.unwrap();

    assert!(eventually(|| !registry.is_occupied(id)).await);
    agent.shutdown().await;
    coordinator.shutdown().await;
}
