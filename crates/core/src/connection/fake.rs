// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted connection for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Connection, ReadOutcome};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// One scripted result for `poll_read`
#[derive(Debug, Clone)]
pub enum FakeRead {
    Data(Vec<u8>),
    Closed,
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
struct FakeState {
    reads: VecDeque<FakeRead>,
    written: Vec<u8>,
    fail_writes: bool,
    closed: bool,
    poll_count: usize,
}

/// Fake connection; clones share state so a test can keep a handle
/// after moving the connection into a registry slot
#[derive(Debug, Clone)]
pub struct FakeConnection {
    state: Arc<Mutex<FakeState>>,
    peer: String,
}

impl FakeConnection {
    pub fn new(peer: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            peer: peer.into(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue bytes for the next `poll_read`
    pub fn push_data(&self, bytes: &[u8]) {
        self.state().reads.push_back(FakeRead::Data(bytes.to_vec()));
    }

    /// Queue an end-of-stream
    pub fn push_closed(&self) {
        self.state().reads.push_back(FakeRead::Closed);
    }

    /// Queue a read error
    pub fn push_error(&self, kind: io::ErrorKind) {
        self.state().reads.push_back(FakeRead::Error(kind));
    }

    /// Make every subsequent `send` fail
    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    /// Everything successfully sent so far
    pub fn written(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    pub fn written_str(&self) -> String {
        String::from_utf8_lossy(&self.written()).into_owned()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Number of `poll_read` calls made
    pub fn poll_count(&self) -> usize {
        self.state().poll_count
    }
}

impl Connection for FakeConnection {
    fn poll_read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let mut state = self.state();
        state.poll_count += 1;
        if state.closed {
            return Ok(ReadOutcome::Closed);
        }
        match state.reads.pop_front() {
            None => Ok(ReadOutcome::Empty),
            Some(FakeRead::Closed) => Ok(ReadOutcome::Closed),
            Some(FakeRead::Error(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            Some(FakeRead::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    let rest = bytes.split_off(n);
                    state.reads.push_front(FakeRead::Data(rest));
                }
                Ok(ReadOutcome::Data(n))
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state();
        if state.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "closed"));
        }
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted write failure"));
        }
        state.written.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) {
        self.state().closed = true;
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
