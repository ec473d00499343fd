// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator control endpoint.
//!
//! There is no command protocol yet: connections are accepted, logged and
//! dropped straight away.

use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Accept and immediately close operator connections, forever
pub async fn run(listener: TcpListener) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!(%peer, "control connection (no command protocol yet), closing");
                drop(stream);
            }
            Err(e) => {
                error!(error = %e, "failed to accept control connection");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
}
