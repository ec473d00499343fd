// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::net::TcpListener;
use std::time::{Duration, Instant};

fn pair() -> (TcpConnection, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (TcpConnection::new(server).unwrap(), client)
}

/// Poll until something other than `Empty` shows up
fn poll_until_ready(conn: &mut TcpConnection, buf: &mut [u8]) -> io::Result<ReadOutcome> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let outcome = conn.poll_read(buf)?;
        if outcome != ReadOutcome::Empty || Instant::now() > deadline {
            return Ok(outcome);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn poll_read_reports_empty_without_blocking() {
    let (mut conn, _client) = pair();
    let mut buf = [0u8; 16];

    let start = Instant::now();
    assert_eq!(conn.poll_read(&mut buf).unwrap(), ReadOutcome::Empty);
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn poll_read_returns_available_bytes() {
    let (mut conn, mut client) = pair();
    client.write_all(b"3\n").unwrap();

    let mut buf = [0u8; 16];
    let outcome = poll_until_ready(&mut conn, &mut buf).unwrap();
    assert_eq!(outcome, ReadOutcome::Data(2));
    assert_eq!(&buf[..2], b"3\n");
}

#[test]
fn poll_read_reports_closed_peer() {
    let (mut conn, client) = pair();
    drop(client);

    let mut buf = [0u8; 16];
    assert_eq!(
        poll_until_ready(&mut conn, &mut buf).unwrap(),
        ReadOutcome::Closed
    );
}

#[test]
fn send_reaches_peer() {
    let (mut conn, mut client) = pair();
    conn.send(b"5").unwrap();

    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = [0u8; 8];
    let n = client.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"5");
}

#[test]
fn close_is_idempotent_and_blocks_further_sends() {
    let (mut conn, _client) = pair();
    conn.close();
    conn.close();

    assert!(conn.send(b"1").is_err());
    let mut buf = [0u8; 4];
    assert_eq!(conn.poll_read(&mut buf).unwrap(), ReadOutcome::Closed);
}

#[test]
fn peer_is_the_client_address() {
    let (conn, client) = pair();
    assert_eq!(conn.peer_addr(), client.local_addr().ok());
    assert_eq!(conn.peer(), client.local_addr().unwrap().to_string());
}
