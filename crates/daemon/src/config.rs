// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `FLOUT_*` environment variables, then command-line flags (applied
//! by the binary).

use flout_core::config::{env_millis, from_toml_file, parse_env, require_nonzero};
use serde::Deserialize;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use flout_core::ConfigError;

/// Default registration port
pub const DEFAULT_REGISTRATION_PORT: u16 = 8122;
/// Default control port
pub const DEFAULT_CONTROL_PORT: u16 = 8080;
/// Default number of worker slots
pub const DEFAULT_CAPACITY: usize = 8;
/// Default silence allowed before a worker is evicted
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default period between liveness sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where workers connect to register
    pub registration_addr: SocketAddr,
    /// Where operators connect (stub, connections are dropped)
    pub control_addr: SocketAddr,
    /// Maximum number of simultaneously registered workers
    pub capacity: usize,
    /// Silence allowed before a worker is evicted
    #[serde(with = "humantime_serde")]
    pub worker_timeout: Duration,
    /// Period of the liveness sweep
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    /// Also write logs to this file
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let loopback = IpAddr::V6(Ipv6Addr::LOCALHOST);
        Self {
            registration_addr: SocketAddr::new(loopback, DEFAULT_REGISTRATION_PORT),
            control_addr: SocketAddr::new(loopback, DEFAULT_CONTROL_PORT),
            capacity: DEFAULT_CAPACITY,
            worker_timeout: DEFAULT_WORKER_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            log_path: None,
        }
    }
}

impl Config {
    /// Defaults, overlaid with `path` (if any) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        from_toml_file(path)
    }

    /// Apply `FLOUT_*` overrides looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = env_millis(&lookup, "FLOUT_WORKER_TIMEOUT_MS")? {
            self.worker_timeout = timeout;
        }
        if let Some(interval) = env_millis(&lookup, "FLOUT_SWEEP_INTERVAL_MS")? {
            self.sweep_interval = interval;
        }
        if let Some(capacity) = parse_env::<_, usize>(&lookup, "FLOUT_CAPACITY")? {
            self.capacity = capacity;
        }
        if let Some(addr) = parse_env(&lookup, "FLOUT_REGISTRATION_ADDR")? {
            self.registration_addr = addr;
        }
        if let Some(addr) = parse_env(&lookup, "FLOUT_CONTROL_ADDR")? {
            self.control_addr = addr;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        require_nonzero("worker_timeout", self.worker_timeout)?;
        require_nonzero("sweep_interval", self.sweep_interval)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
