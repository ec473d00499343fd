// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flout coordinator daemon (floutd)
//!
//! Admits workers on the registration endpoint and evicts silent ones
//! until SIGTERM or SIGINT.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use flout_core::clock::as_millis;
use flout_daemon::{Config, Coordinator};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "floutd",
    version,
    about = "Flout coordinator - worker registration and liveness"
)]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address workers register on
    #[arg(long)]
    registration_addr: Option<SocketAddr>,

    /// Address of the operator control endpoint
    #[arg(long)]
    control_addr: Option<SocketAddr>,

    /// Maximum number of registered workers
    #[arg(long)]
    capacity: Option<usize>,

    /// Silence allowed before a worker is evicted, in milliseconds
    #[arg(long)]
    worker_timeout_ms: Option<u64>,

    /// Period between liveness sweeps, in milliseconds
    #[arg(long)]
    sweep_interval_ms: Option<u64>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(addr) = self.registration_addr {
            config.registration_addr = addr;
        }
        if let Some(addr) = self.control_addr {
            config.control_addr = addr;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(ms) = self.worker_timeout_ms {
            config.worker_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.sweep_interval_ms {
            config.sweep_interval = Duration::from_millis(ms);
        }
        if let Some(path) = self.log_file {
            config.log_path = Some(path);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = setup_logging(config.log_path.as_deref())?;

    let mut coordinator = match Coordinator::startup(config).await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to start coordinator: {}", e);
            return Err(e.into());
        }
    };

    // Without registration no worker can ever join
    let Some(addr) = coordinator.registration_addr() else {
        let reason = coordinator
            .registration_error()
            .map(ToString::to_string)
            .unwrap_or_default();
        coordinator.shutdown().await;
        return Err(format!("registration endpoint unavailable: {reason}").into());
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(%addr, capacity = coordinator.config().capacity, "coordinator ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    coordinator.shutdown().await;
    info!(uptime_ms = as_millis(coordinator.uptime()), "coordinator stopped");
    Ok(())
}

fn setup_logging(
    log_path: Option<&Path>,
) -> std::io::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_path {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            std::fs::create_dir_all(dir)?;
            let file_name = path.file_name().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("log path has no file name: {}", path.display()),
                )
            })?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(non_blocking)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
