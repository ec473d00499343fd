// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flout coordinator daemon
//!
//! Worker membership and liveness: a registration endpoint that admits
//! workers into a fixed-capacity registry, and a sweeper that evicts the
//! ones that go quiet.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod control;
pub mod lifecycle;
pub mod listener;
pub mod sweeper;

pub use config::{Config, ConfigError};
pub use lifecycle::{Actor, Coordinator, LifecycleError, WorkerRegistry};
pub use listener::{register, ListenerError, Registration, RegistrationListener};
pub use sweeper::{EvictionReason, SweepReport, Sweeper};
