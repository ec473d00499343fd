// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte-stream handles owned by registry slots

mod tcp;

pub use tcp::TcpConnection;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeConnection, FakeRead};

use std::io;

/// Result of a single non-blocking read attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were read into the buffer
    Data(usize),
    /// Nothing available right now
    Empty,
    /// The peer closed its side of the stream
    Closed,
}

/// A worker connection as seen by the coordinator.
///
/// No method may block: reads report [`ReadOutcome::Empty`] instead of
/// waiting, and a write that cannot complete immediately is an error.
pub trait Connection: Send + 'static {
    /// Read whatever is available without waiting
    fn poll_read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Write all of `bytes` or fail
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Shut the stream down. Calling this more than once is harmless.
    fn close(&mut self);

    /// Remote address for log fields
    fn peer(&self) -> String;
}
