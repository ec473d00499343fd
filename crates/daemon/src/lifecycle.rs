// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator lifecycle: startup, shutdown.
//!
//! The coordinator owns the registry and the three actors that share it.
//! A listener that fails to bind takes down only its own actor; the
//! caller decides whether a coordinator without registration is useful.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use flout_core::clock::as_millis;
use flout_core::{Clock, SlotRegistry, SystemClock, TcpConnection};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigError};
use crate::control;
use crate::listener::{self, ListenerError, RegistrationListener};
use crate::sweeper::Sweeper;

/// Registry type used by a running coordinator
pub type WorkerRegistry = SlotRegistry<TcpConnection>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which actor a task handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Registration,
    Sweeper,
    Control,
}

/// A running coordinator
pub struct Coordinator {
    config: Config,
    registry: Arc<WorkerRegistry>,
    registration: Result<SocketAddr, ListenerError>,
    control_addr: Option<SocketAddr>,
    tasks: Vec<(Actor, JoinHandle<()>)>,
    start_time: Instant,
    stopped: bool,
}

impl Coordinator {
    /// Start the coordinator with the system clock
    pub async fn startup(config: Config) -> Result<Self, LifecycleError> {
        Self::startup_with_clock(config, SystemClock).await
    }

    /// Validate config, build the registry, bind endpoints and spawn actors
    pub async fn startup_with_clock<K: Clock>(
        config: Config,
        clock: K,
    ) -> Result<Self, LifecycleError> {
        config.validate()?;

        let registry = Arc::new(WorkerRegistry::new(config.capacity));
        let mut tasks = Vec::new();

        // 1. Registration endpoint
        let registration = match listener::bind(config.registration_addr).await {
            Ok(bound) => {
                let actor = RegistrationListener::new(bound, Arc::clone(&registry), clock.clone());
                let addr = actor.local_addr()?;
                tasks.push((Actor::Registration, tokio::spawn(actor.run())));
                info!(%addr, capacity = config.capacity, "registration endpoint listening");
                Ok(addr)
            }
            Err(e) => {
                error!(error = %e, "registration endpoint failed to start");
                Err(e)
            }
        };

        // 2. Liveness sweeper
        let sweeper = Sweeper::new(Arc::clone(&registry), clock, config.worker_timeout);
        let timeout = sweeper.timeout();
        tasks.push((
            Actor::Sweeper,
            tokio::spawn(sweeper.run(config.sweep_interval)),
        ));
        info!(
            timeout_ms = as_millis(timeout),
            interval_ms = as_millis(config.sweep_interval),
            "liveness sweeper started"
        );

        // 3. Control endpoint (stub)
        let control_addr = match listener::bind(config.control_addr).await {
            Ok(bound) => {
                let addr = bound.local_addr().unwrap_or(config.control_addr);
                tasks.push((Actor::Control, tokio::spawn(control::run(bound))));
                info!(%addr, "control endpoint listening");
                Some(addr)
            }
            Err(e) => {
                warn!(error = %e, "control endpoint failed to start");
                None
            }
        };

        Ok(Self {
            config,
            registry,
            registration,
            control_addr,
            tasks,
            start_time: Instant::now(),
            stopped: false,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the worker registry
    pub fn registry(&self) -> &Arc<WorkerRegistry> {
        &self.registry
    }

    /// Bound registration address, `None` if the endpoint failed to bind
    pub fn registration_addr(&self) -> Option<SocketAddr> {
        self.registration.as_ref().ok().copied()
    }

    /// Why the registration endpoint is down, if it is
    pub fn registration_error(&self) -> Option<&ListenerError> {
        self.registration.as_ref().err()
    }

    pub fn control_addr(&self) -> Option<SocketAddr> {
        self.control_addr
    }

    /// Actors currently running
    pub fn running_actors(&self) -> Vec<Actor> {
        self.tasks
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .map(|(actor, _)| *actor)
            .collect()
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Stop all actors and close every worker connection
    pub async fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        info!("shutting down coordinator...");

        for (_, task) in &self.tasks {
            task.abort();
        }
        for (actor, task) in self.tasks.drain(..) {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(?actor, error = %e, "actor ended abnormally");
                }
            }
        }

        let released = self.registry.release_all();
        info!(released, "coordinator shutdown complete");
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        for (_, task) in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
