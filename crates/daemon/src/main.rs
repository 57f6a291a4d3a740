// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orcd`: the long-running process that owns the durable store.
//!
//! Architecture:
//! - Listener task: handles socket I/O, dispatches each request against the
//!   shared `Store`/`Supervisor`.
//! - Engine loop: drives `Supervisor::tick` on a fixed interval and owns
//!   the periodic checkpoint and heartbeat writes.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::Path;
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

use orc_adapters::AgentCliConfig;
use orc_daemon::lifecycle::{self, LifecycleError, Paths};
use orc_daemon::listener::{ListenCtx, Listener};
use orc_daemon::supervisor::Supervisor;
use orc_engine::Config;

const LOG_ROTATE_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("orcd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("orcd {}", env!("CARGO_PKG_VERSION"));
                println!("Orchestrator daemon — owns the durable store and drives every");
                println!("engine component. Started automatically by `orc`; not meant to be");
                println!("invoked directly.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -V, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: orcd [--help | --version]");
                std::process::exit(2);
            }
        }
    }

    let paths = Paths::load()?;
    rotate_log_if_needed(&paths.log_path);
    write_startup_marker(&paths.log_path)?;
    let _log_guard = setup_logging(&paths.log_path)?;

    info!("starting orcd {}", env!("CARGO_PKG_VERSION"));

    let startup = match lifecycle::startup(paths.clone()) {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&paths.lock_path).unwrap_or_default().trim().to_string();
            let version = std::fs::read_to_string(&paths.version_path).unwrap_or_default().trim().to_string();
            eprintln!("orcd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            if !version.is_empty() {
                eprintln!("  version: {version}");
            }
            std::process::exit(4);
        }
        Err(e) => {
            write_startup_error(&paths.log_path, &e);
            error!("failed to start daemon: {e}");
            return Err(e.into());
        }
    };

    let state_dir = startup.daemon.paths.state_dir.clone();
    let config = Config::from_env(state_dir.clone());
    let agent_cli_config = load_agent_cli_config(&state_dir);
    let merge_lock_path = state_dir.join("merge.lock");
    let supervisor = Arc::new(Supervisor::new(&config, agent_cli_config, merge_lock_path));

    let shutdown_notify = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        store: Arc::clone(&startup.daemon.store),
        supervisor: Arc::clone(&supervisor),
        start_time: startup.daemon.start_time,
        shutdown: Arc::clone(&shutdown_notify),
    });
    let listener = Listener::new(startup.listener, ctx);
    tokio::spawn(listener.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("daemon ready, listening on {}", startup.daemon.paths.socket_path.display());
    println!("READY");

    // Created outside the loop: `tokio::select!` re-evaluates its branches
    // every iteration, so an inline `sleep()` here would reset on every
    // request the listener handles and the tick would never fire under load.
    let tick_interval = orc_daemon::env::tick_interval_ms().unwrap_or(config.scheduler.tick_interval);
    let mut ticker = tokio::time::interval(tick_interval);
    let mut tick_number: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tick_number += 1;
                let mut store = startup.daemon.store.lock().await;
                let report = supervisor.tick(&mut store, tick_number).await;
                drop(store);
                if report.provisioned.is_some() || !report.closed.is_empty() || !report.reaped.is_empty() {
                    info!(?report, "tick");
                }
                if let Err(e) = startup.daemon.write_heartbeat() {
                    error!("failed to write heartbeat: {e}");
                }
            }
            _ = shutdown_notify.notified() => {
                info!("shutdown requested via command");
                break;
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    startup.daemon.shutdown().await?;
    info!("daemon stopped");
    Ok(())
}

fn load_agent_cli_config(state_dir: &Path) -> AgentCliConfig {
    let path = state_dir.join("agent_cli.toml");
    std::fs::read_to_string(&path).ok().and_then(|contents| toml::from_str(&contents).ok()).unwrap_or_else(default_agent_cli_config)
}

fn default_agent_cli_config() -> AgentCliConfig {
    AgentCliConfig {
        binary: "claude".to_string(),
        version_flag: "--version".to_string(),
        default_command: Some("claude".to_string()),
        role_commands: std::collections::HashMap::new(),
    }
}

fn setup_logging(log_path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let parent = log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(parent)?;
    let file_name = log_path.file_name().ok_or(LifecycleError::NoStateDir)?;
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();
    Ok(guard)
}

fn rotate_log_if_needed(log_path: &Path) {
    let Ok(metadata) = std::fs::metadata(log_path) else { return };
    if metadata.len() > LOG_ROTATE_THRESHOLD_BYTES {
        let rotated = log_path.with_extension("log.1");
        let _ = std::fs::rename(log_path, rotated);
    }
}

/// Written before the tracing subscriber is installed, so a later `ERROR`
/// line is always preceded by a marker the CLI can anchor its search on
/// (`daemon_process::read_startup_error`).
fn write_startup_marker(log_path: &Path) -> std::io::Result<()> {
    use std::io::Write;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "--- orcd startup marker ---")
}

fn write_startup_error(log_path: &Path, error: &LifecycleError) {
    use std::io::Write;
    let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(log_path) else { return };
    let _ = writeln!(file, "ERROR failed to start daemon: {error}");
}
