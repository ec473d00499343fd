// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! flout-core: membership primitives shared by the coordinator and workers
//!
//! - Fixed-capacity slot registry with per-slot locking
//! - Connection seam (non-blocking TCP, scripted fake for tests)
//! - Text registration/heartbeat protocol
//! - Clock abstraction
//! - Layered configuration helpers

pub mod clock;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod registry;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::ConfigError;
pub use connection::{Connection, ReadOutcome, TcpConnection};
pub use protocol::{Ack, ProtocolError, ERR_CAPACITY_EXHAUSTED, ERR_HANDSHAKE_FAILED};
pub use registry::{CapacityExhausted, Member, RegistryError, SlotId, SlotRegistry, Visit};

#[cfg(any(test, feature = "test-support"))]
pub use connection::{FakeConnection, FakeRead};
