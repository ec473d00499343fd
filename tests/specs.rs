//! Behavioral specifications for the flout coordinator and worker.
//!
//! These drive an in-process coordinator and worker agents over real
//! loopback sockets. The binaries' CLI tests live with each crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// coordinator/
#[path = "specs/coordinator/liveness.rs"]
mod coordinator_liveness;
#[path = "specs/coordinator/registration.rs"]
mod coordinator_registration;

// worker/
#[path = "specs/worker/heartbeat.rs"]
mod worker_heartbeat;
