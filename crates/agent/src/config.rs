// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker agent configuration

use flout_core::config::{env_millis, from_toml_file, parse_env, require_nonzero};
use serde::Deserialize;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

pub use flout_core::ConfigError;

/// Default coordinator registration address
pub const DEFAULT_COORDINATOR_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 8122);
/// Default heartbeat period
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);
/// Default limit on establishing the registration connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default limit on waiting for the acknowledgment
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Coordinator registration endpoint
    pub coordinator_addr: SocketAddr,
    #[serde(with = "humantime_serde")]
    pub heartbeat_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub ack_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            coordinator_addr: DEFAULT_COORDINATOR_ADDR,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }
}

impl AgentConfig {
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
        if let Some(addr) = parse_env(&lookup, "FLOUT_COORDINATOR_ADDR")? {
            self.coordinator_addr = addr;
        }
        if let Some(value) = env_millis(&lookup, "FLOUT_HEARTBEAT_INTERVAL_MS")? {
            self.heartbeat_interval = value;
        }
        if let Some(value) = env_millis(&lookup, "FLOUT_CONNECT_TIMEOUT_MS")? {
            self.connect_timeout = value;
        }
        if let Some(value) = env_millis(&lookup, "FLOUT_ACK_TIMEOUT_MS")? {
            self.ack_timeout = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_nonzero("heartbeat_interval", self.heartbeat_interval)?;
        require_nonzero("connect_timeout", self.connect_timeout)?;
        require_nonzero("ack_timeout", self.ack_timeout)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
