// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness sweeper: the fleet's failure detector.
//!
//! Every cycle visits each occupied slot, drains whatever the worker has
//! sent (any byte counts as proof of life), then evicts the slot if it
//! has been silent for longer than the timeout. A read error or a closed
//! stream evicts immediately. Elapsed time is recomputed every cycle, so
//! a late cycle can only delay an eviction, never cause an early one.

use std::sync::Arc;
use std::time::Duration;

use flout_core::clock::as_millis;
use flout_core::{Clock, Connection, ReadOutcome, SlotId, SlotRegistry, Visit};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

/// Scratch buffer size for draining worker input
const READ_BUFFER_SIZE: usize = 1024;

/// Reads attempted per slot per cycle, so one chatty worker cannot
/// hold up the rest of the sweep
const MAX_READS_PER_SLOT: usize = 16;

/// Why a slot was evicted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictionReason {
    /// Nothing read for longer than the timeout
    TimedOut { idle: Duration },
    /// The connection reported an error
    ReadError(String),
    /// The worker closed its end
    PeerClosed,
}

/// What one sweep cycle did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Occupied slots examined
    pub visited: usize,
    /// Slots whose activity stamp was refreshed
    pub refreshed: Vec<SlotId>,
    /// Slots released this cycle
    pub evicted: Vec<(SlotId, EvictionReason)>,
}

impl SweepReport {
    pub fn was_evicted(&self, slot: SlotId) -> bool {
        self.evicted.iter().any(|(s, _)| *s == slot)
    }
}

/// Result of draining a connection
struct Drained {
    bytes: usize,
    failure: Option<EvictionReason>,
}

fn drain<C: Connection>(connection: &mut C, buf: &mut [u8]) -> Drained {
    let mut bytes = 0;
    for _ in 0..MAX_READS_PER_SLOT {
        match connection.poll_read(buf) {
            Ok(ReadOutcome::Data(n)) => bytes += n,
            Ok(ReadOutcome::Empty) => break,
            Ok(ReadOutcome::Closed) => {
                return Drained {
                    bytes,
                    failure: Some(EvictionReason::PeerClosed),
                }
            }
            Err(e) => {
                return Drained {
                    bytes,
                    failure: Some(EvictionReason::ReadError(e.to_string())),
                }
            }
        }
    }
    Drained {
        bytes,
        failure: None,
    }
}

/// Periodic liveness check over a shared registry
pub struct Sweeper<C, K> {
    registry: Arc<SlotRegistry<C>>,
    clock: K,
    timeout: Duration,
}

impl<C: Connection, K: Clock> Sweeper<C, K> {
    pub fn new(registry: Arc<SlotRegistry<C>>, clock: K, timeout: Duration) -> Self {
        Self {
            registry,
            clock,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one cycle over all occupied slots
    pub fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let mut buf = [0u8; READ_BUFFER_SIZE];

        let visited = self.registry.for_each_occupied(|slot, member| {
            let drained = drain(member.connection(), &mut buf);

            if drained.bytes > 0 {
                member.touch(self.clock.now());
                report.refreshed.push(slot);
                trace!(%slot, bytes = drained.bytes, "worker activity");
            }

            if let Some(reason) = drained.failure {
                match &reason {
                    EvictionReason::ReadError(error) => {
                        warn!(%slot, peer = %member.peer(), %error, "read failed, evicting worker")
                    }
                    _ => info!(%slot, peer = %member.peer(), "worker disconnected"),
                }
                report.evicted.push((slot, reason));
                return Visit::Release;
            }

            let idle = self.clock.since(member.last_activity());
            if idle > self.timeout {
                info!(
                    %slot,
                    peer = %member.peer(),
                    idle_ms = as_millis(idle),
                    registered_ms = as_millis(self.clock.since(member.registered_at())),
                    "worker timed out, evicting"
                );
                report.evicted.push((slot, EvictionReason::TimedOut { idle }));
                return Visit::Release;
            }

            trace!(%slot, idle_ms = as_millis(idle), "worker alive");
            Visit::Keep
        });

        report.visited = visited;
        report
    }

    /// Sweep every `interval` until the task is cancelled
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.sweep_once();
            if !report.evicted.is_empty() {
                info!(
                    evicted = report.evicted.len(),
                    remaining = report.visited - report.evicted.len(),
                    "liveness sweep evicted workers"
                );
            } else {
                debug!(visited = report.visited, "liveness sweep");
            }
        }
    }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
