// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registration listener.
//!
//! Turns each inbound worker connection into a registry slot, or refuses
//! it with an error code. The handshake never waits on the peer: the
//! socket is made non-blocking before any I/O, and the only writes are a
//! few bytes that fit in the socket buffer.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use flout_core::protocol::{encode_identity, Ack, ERR_CAPACITY_EXHAUSTED, ERR_HANDSHAKE_FAILED};
use flout_core::{CapacityExhausted, Clock, Connection, SlotId, SlotRegistry, TcpConnection};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept so a persistent error (e.g. fd exhaustion)
/// does not spin the task
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Listener errors
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind a TCP listener, reporting the address on failure
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}

/// Outcome of one registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Slot allocated and identity delivered
    Registered(SlotId),
    /// Fleet full; peer told and disconnected
    Refused,
    /// Slot allocated but the acknowledgment could not be written;
    /// the slot was released again
    RolledBack(SlotId),
}

/// Run the registration handshake for one connection.
///
/// On success the connection is owned by the returned slot.
pub fn register<C: Connection, K: Clock>(
    registry: &SlotRegistry<C>,
    clock: &K,
    connection: C,
) -> Registration {
    let peer = connection.peer();

    let slot = match registry.allocate(connection, clock.now()) {
        Ok(slot) => slot,
        Err(CapacityExhausted {
            mut connection,
            capacity,
        }) => {
            warn!(%peer, capacity, "no free slot, refusing worker");
            let refusal = Ack::Refused(ERR_CAPACITY_EXHAUSTED).encode();
            if let Err(e) = connection.send(refusal.as_bytes()) {
                debug!(%peer, error = %e, "could not deliver refusal");
            }
            connection.close();
            return Registration::Refused;
        }
    };

    if let Err(e) = registry.send(slot, encode_identity(slot).as_bytes()) {
        // A worker that never learned its identity must not hold a slot
        error!(%slot, %peer, error = %e, "failed to acknowledge registration, rolling back");
        registry.release(slot);
        return Registration::RolledBack(slot);
    }

    if let Err(e) = registry.touch(slot, clock.now()) {
        // Only possible if the sweeper already dropped the peer
        debug!(%slot, %peer, error = %e, "slot vanished right after registration");
    }

    info!(%slot, %peer, "worker registered");
    Registration::Registered(slot)
}

/// Accepts worker connections and registers them
pub struct RegistrationListener<K> {
    listener: TcpListener,
    registry: Arc<SlotRegistry<TcpConnection>>,
    clock: K,
}

impl<K: Clock> RegistrationListener<K> {
    pub fn new(listener: TcpListener, registry: Arc<SlotRegistry<TcpConnection>>, clock: K) -> Self {
        Self {
            listener,
            registry,
            clock,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept forever. Per-connection failures are logged and contained.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "incoming worker connection");
                    self.handle(stream, addr);
                }
                Err(e) => {
                    error!(error = %e, "failed to accept worker connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            }
        }
    }

    fn handle(&self, stream: tokio::net::TcpStream, addr: SocketAddr) {
        let stream = match stream.into_std() {
            Ok(stream) => stream,
            Err(e) => {
                error!(peer = %addr, error = %e, "failed to detach worker socket");
                return;
            }
        };

        if let Err(e) = stream.set_nonblocking(true) {
            error!(peer = %addr, error = %e, "can't make worker socket non-blocking, refusing");
            refuse_raw(stream, addr, ERR_HANDSHAKE_FAILED);
            return;
        }

        match TcpConnection::new(stream) {
            Ok(connection) => {
                register(&self.registry, &self.clock, connection);
            }
            Err(e) => {
                error!(peer = %addr, error = %e, "failed to set up worker connection");
            }
        }
    }
}

/// Best-effort error code on a socket that never made it into a slot
fn refuse_raw(mut stream: std::net::TcpStream, peer: SocketAddr, code: i64) {
    if let Err(e) = stream.write_all(Ack::Refused(code).encode().as_bytes()) {
        debug!(%peer, code, error = %e, "could not deliver refusal");
    }
    if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
        debug!(%peer, error = %e, "shutdown after refusal failed");
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
