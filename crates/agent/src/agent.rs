// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker agent: registration handshake and heartbeats.
//!
//! The agent holds one connection for its whole registered life. It never
//! re-registers: once evicted or refused it is up to a supervisor to start
//! a fresh process.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use flout_core::protocol::{describe_error_code, encode_heartbeat, parse_ack, MAX_ACK_LEN};
use flout_core::{Ack, ProtocolError, SlotId};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::AgentConfig;

/// Where the agent is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Unregistered,
    Registering,
    Registered { id: SlotId },
    ShutDown,
}

/// Agent errors. All registration errors are fatal to the agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to connect to coordinator at {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("no acknowledgment from coordinator")]
    AckTimeout,

    #[error("failed to read acknowledgment: {0}")]
    AckRead(#[source] io::Error),

    #[error("coordinator closed the connection without acknowledging")]
    ClosedWithoutAck,

    #[error("registration refused with code {code}: {}", refusal_reason(.code))]
    Refused { code: i64 },

    #[error("invalid acknowledgment: {0}")]
    InvalidAck(#[from] ProtocolError),

    #[error("operation not valid while {0:?}")]
    InvalidState(AgentState),
}

fn refusal_reason(code: &i64) -> &'static str {
    describe_error_code(*code)
}

/// Heartbeat counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatStats {
    pub sent: u64,
    pub failed: u64,
}

pub struct Agent {
    config: AgentConfig,
    state: AgentState,
    stream: Option<TcpStream>,
    stats: HeartbeatStats,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            state: AgentState::Unregistered,
            stream: None,
            stats: HeartbeatStats::default(),
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Identity assigned by the coordinator, once registered
    pub fn id(&self) -> Option<SlotId> {
        match self.state {
            AgentState::Registered { id } => Some(id),
            _ => None,
        }
    }

    pub fn stats(&self) -> HeartbeatStats {
        self.stats
    }

    /// Connect to the coordinator and wait for an identity.
    ///
    /// Any failure leaves the agent shut down.
    pub async fn register(&mut self) -> Result<SlotId, AgentError> {
        if self.state != AgentState::Unregistered {
            return Err(AgentError::InvalidState(self.state));
        }
        self.state = AgentState::Registering;

        match self.handshake().await {
            Ok((id, stream)) => {
                self.stream = Some(stream);
                self.state = AgentState::Registered { id };
                info!(%id, coordinator = %self.config.coordinator_addr, "registered");
                Ok(id)
            }
            Err(e) => {
                self.state = AgentState::ShutDown;
                Err(e)
            }
        }
    }

    async fn handshake(&self) -> Result<(SlotId, TcpStream), AgentError> {
        let addr = self.config.coordinator_addr;
        let mut stream = match timeout(self.config.connect_timeout, TcpStream::connect(addr)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(AgentError::Connect { addr, source }),
            Err(_) => {
                return Err(AgentError::Connect {
                    addr,
                    source: io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
                })
            }
        };
        debug!(%addr, "connected, waiting for acknowledgment");

        let mut buf = [0u8; MAX_ACK_LEN];
        let n = timeout(self.config.ack_timeout, stream.read(&mut buf))
            .await
            .map_err(|_| AgentError::AckTimeout)?
            .map_err(AgentError::AckRead)?;
        if n == 0 {
            return Err(AgentError::ClosedWithoutAck);
        }

        match parse_ack(&buf[..n])? {
            Ack::Registered(id) => Ok((id, stream)),
            Ack::Refused(code) => Err(AgentError::Refused { code }),
        }
    }

    /// Send a heartbeat every interval until `shutdown` resolves.
    ///
    /// A failed write is logged and counted; the coordinator decides
    /// whether the session survives.
    pub async fn run_heartbeats<F>(&mut self, shutdown: F) -> Result<HeartbeatStats, AgentError>
    where
        F: Future<Output = ()>,
    {
        let AgentState::Registered { id } = self.state else {
            return Err(AgentError::InvalidState(self.state));
        };
        let Some(stream) = self.stream.as_mut() else {
            return Err(AgentError::InvalidState(self.state));
        };

        let period = self.config.heartbeat_interval;
        let frame = encode_heartbeat(id);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    // A write that cannot finish within one period counts as failed
                    match timeout(period, stream.write_all(&frame)).await {
                        Ok(Ok(())) => {
                            self.stats.sent += 1;
                            debug!(%id, "heartbeat sent");
                        }
                        Ok(Err(e)) => {
                            self.stats.failed += 1;
                            warn!(%id, error = %e, failed = self.stats.failed, "heartbeat write failed");
                        }
                        Err(_) => {
                            self.stats.failed += 1;
                            warn!(%id, failed = self.stats.failed, "heartbeat write timed out");
                        }
                    }
                }
            }
        }

        Ok(self.stats)
    }

    /// Close the connection. Idempotent.
    pub async fn shutdown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "error closing coordinator connection");
            }
        }
        if self.state != AgentState::ShutDown {
            info!(
                sent = self.stats.sent,
                failed = self.stats.failed,
                "agent shut down"
            );
        }
        self.state = AgentState::ShutDown;
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
