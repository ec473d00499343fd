// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text wire protocol between coordinator and workers.
//!
//! Registration: the coordinator writes the assigned slot index as a
//! decimal integer, or a negative error code before closing. Heartbeats:
//! the worker writes its identity followed by `\n`. The coordinator treats
//! any bytes on an established connection as proof of life, so the
//! newline is framing for future traffic, not something liveness relies on.

use crate::registry::SlotId;
use thiserror::Error;

/// The fleet is full
pub const ERR_CAPACITY_EXHAUSTED: i64 = -1;

/// The coordinator accepted the connection but could not set it up
pub const ERR_HANDSHAKE_FAILED: i64 = -2;

/// Delimiter terminating each heartbeat frame
pub const HEARTBEAT_DELIMITER: u8 = b'\n';

/// Upper bound on an acknowledgment's encoded length
pub const MAX_ACK_LEN: usize = 32;

/// Coordinator reply to a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Registered(SlotId),
    Refused(i64),
}

impl Ack {
    pub fn encode(&self) -> String {
        match self {
            Ack::Registered(id) => encode_identity(*id),
            Ack::Refused(code) => code.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty acknowledgment")]
    Empty,
    #[error("acknowledgment is not a decimal integer: {0:?}")]
    NotANumber(String),
    #[error("acknowledgment longer than {MAX_ACK_LEN} bytes")]
    TooLong,
}

/// Human readable meaning of a refusal code
pub fn describe_error_code(code: i64) -> &'static str {
    match code {
        ERR_CAPACITY_EXHAUSTED => "no free slot, fleet is at capacity",
        ERR_HANDSHAKE_FAILED => "coordinator failed to set up the connection",
        _ => "unknown error code",
    }
}

pub fn encode_identity(id: SlotId) -> String {
    id.index().to_string()
}

/// One heartbeat frame: identity plus delimiter
pub fn encode_heartbeat(id: SlotId) -> Vec<u8> {
    let mut frame = encode_identity(id).into_bytes();
    frame.push(HEARTBEAT_DELIMITER);
    frame
}

/// Parse the bytes a worker received in reply to connecting.
///
/// Surrounding whitespace and trailing NUL padding are ignored.
pub fn parse_ack(bytes: &[u8]) -> Result<Ack, ProtocolError> {
    if bytes.len() > MAX_ACK_LEN {
        return Err(ProtocolError::TooLong);
    }
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_end_matches('\0').trim();
    if text.is_empty() {
        return Err(ProtocolError::Empty);
    }
    let value: i64 = text
        .parse()
        .map_err(|_| ProtocolError::NotANumber(text.to_string()))?;
    if value < 0 {
        return Ok(Ack::Refused(value));
    }
    usize::try_from(value)
        .map(|index| Ack::Registered(SlotId::new(index)))
        .map_err(|_| ProtocolError::NotANumber(text.to_string()))
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
