// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flout worker agent
//!
//! Registers with the coordinator, then proves liveness by sending its
//! identity on a fixed period over the registration connection.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod agent;
pub mod config;

pub use agent::{Agent, AgentError, AgentState, HeartbeatStats};
pub use config::{AgentConfig, ConfigError};
