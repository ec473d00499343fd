//! Shared helpers for specs

#![allow(dead_code)]

pub use std::net::SocketAddr;
pub use std::time::Duration;

pub use flout_agent::{Agent, AgentConfig, AgentError, AgentState};
pub use flout_core::SlotId;
pub use flout_daemon::{Config, Coordinator};
pub use tokio::io::{AsyncReadExt, AsyncWriteExt};
pub use tokio::net::TcpStream;

/// How long a spec waits for something that should happen promptly
pub const SETTLE: Duration = Duration::from_secs(3);

/// Coordinator config on ephemeral loopback ports
pub fn coordinator_config(capacity: usize, worker_timeout_ms: u64) -> Config {
    Config {
        registration_addr: "127.0.0.1:0".parse().unwrap(),
        control_addr: "127.0.0.1:0".parse().unwrap(),
        capacity,
        worker_timeout: Duration::from_millis(worker_timeout_ms),
        sweep_interval: Duration::from_millis(25),
        log_path: None,
    }
}

pub async fn start_coordinator(capacity: usize, worker_timeout_ms: u64) -> Coordinator {
    Coordinator::startup(coordinator_config(capacity, worker_timeout_ms))
        .await
        .unwrap()
}

pub fn registration_addr(coordinator: &Coordinator) -> SocketAddr {
    coordinator.registration_addr().unwrap()
}

/// Connect as a bare worker and return the stream with the ack text
pub async fn connect_worker(addr: SocketAddr) -> (TcpStream, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut buf = [0u8; 32];
    let n = tokio::time::timeout(SETTLE, stream.read(&mut buf))
        .await
        .expect("no acknowledgment")
        .unwrap();
    (stream, String::from_utf8_lossy(&buf[..n]).into_owned())
}

/// True once the stream reports end of file
pub async fn closed_by_peer(stream: &mut TcpStream) -> bool {
    let mut buf = [0u8; 32];
    matches!(
        tokio::time::timeout(SETTLE, stream.read(&mut buf)).await,
        Ok(Ok(0)) | Ok(Err(_))
    )
}

/// Poll `check` until it holds or `SETTLE` runs out
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    let deadline = tokio::time::Instant::now() + SETTLE;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

pub fn agent_config(addr: SocketAddr, heartbeat_ms: u64) -> AgentConfig {
    AgentConfig {
        coordinator_addr: addr,
        heartbeat_interval: Duration::from_millis(heartbeat_ms),
        ..AgentConfig::default()
    }
}
