// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tetherd: keep local trees replicated onto a remote agent.

use std::path::PathBuf;
use tether_adapters::{watch_roots, DesktopNotifyAdapter, ProcessLauncher};
use tether_core::SystemClock;
use tether_daemon::engine::status::LogSink;
use tether_daemon::{engine, Config, EngineOpts};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path =
        PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "tether.toml".to_string()));
    let config = Config::load(&config_path)?;
    let mapping = config.mapping()?;
    let skippers = config.skippers()?;

    let engine = engine::start(
        EngineOpts { mapping: mapping.clone(), skippers, debounce_window: config.debounce_window() },
        ProcessLauncher::new(&config.agent_command),
        DesktopNotifyAdapter::new(),
        SystemClock,
        LogSink,
    );

    let roots: Vec<PathBuf> = mapping.entries().iter().map(|e| e.local.clone()).collect();
    let feed = engine.clone();
    let _watcher = watch_roots(&roots, move |paths| feed.paths(paths))?;
    tracing::info!(roots = roots.len(), "tetherd running");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    engine.close();
    engine.quiesce().await;
    Ok(())
}
