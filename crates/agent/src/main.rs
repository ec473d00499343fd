// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! flout-worker - registers with a coordinator and sends heartbeats

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use flout_agent::{Agent, AgentConfig};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "flout-worker",
    version,
    about = "Flout worker - joins a coordinator's fleet"
)]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Coordinator registration address
    #[arg(long)]
    coordinator: Option<SocketAddr>,

    /// Heartbeat period in milliseconds
    #[arg(long)]
    heartbeat_interval_ms: Option<u64>,

    /// Connect timeout in milliseconds
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Acknowledgment timeout in milliseconds
    #[arg(long)]
    ack_timeout_ms: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut AgentConfig) {
        if let Some(addr) = self.coordinator {
            config.coordinator_addr = addr;
        }
        if let Some(ms) = self.heartbeat_interval_ms {
            config.heartbeat_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.ack_timeout_ms {
            config.ack_timeout = Duration::from_millis(ms);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging();

    let mut config = AgentConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let mut agent = Agent::new(config.clone());
    let id = agent
        .register()
        .await
        .with_context(|| format!("registration with {} failed", config.coordinator_addr))?;
    info!(%id, "worker registered, sending heartbeats");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
    };

    agent.run_heartbeats(shutdown).await?;
    agent.shutdown().await;
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
