// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-blocking TCP connection

use super::{Connection, ReadOutcome};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// Accepted worker socket switched to non-blocking mode
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    peer: Option<SocketAddr>,
    closed: bool,
}

impl TcpConnection {
    /// Take ownership of `stream` and make it non-blocking.
    ///
    /// Fails if the socket cannot be switched, in which case the caller
    /// still owns nothing and the stream is dropped (closed).
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        let peer = stream.peer_addr().ok();
        Ok(Self {
            stream,
            peer,
            closed: false,
        })
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl Connection for TcpConnection {
    fn poll_read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        if self.closed {
            return Ok(ReadOutcome::Closed);
        }
        match self.stream.read(buf) {
            Ok(0) if !buf.is_empty() => Ok(ReadOutcome::Closed),
            Ok(0) => Ok(ReadOutcome::Empty),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(ReadOutcome::Empty),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Empty),
            Err(e) => Err(e),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already closed",
            ));
        }
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            // NotConnected just means the peer got there first
            if e.kind() != io::ErrorKind::NotConnected {
                tracing::debug!(peer = %self.peer(), error = %e, "socket shutdown failed");
            }
        }
    }

    fn peer(&self) -> String {
        self.peer
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
