// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc`: the operator-facing front-end over `orcd` (spec.md §6). Every
//! subcommand is a thin request/response round trip over the daemon's
//! Unix socket; no orchestration logic lives in this binary.

mod client;
mod commands;
mod daemon_process;
mod env;
mod exit_error;

use clap::{Parser, Subcommand};

use commands::{authorize, merge, queue, run, scheduler};
use exit_error::ExitError;

#[derive(Parser, Debug)]
#[command(name = "orc", version, about = "Drive autonomous coding agents through tmux sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enqueue a project specification for orchestration.
    Run(run::RunArgs),
    /// Inspect or manipulate the project queue.
    Queue(queue::QueueArgs),
    /// Manage recurring tmux check-ins, or ensure `orcd` is running.
    Scheduler(scheduler::SchedulerArgs),
    /// Run the auto-merge pipeline against a completed project.
    Merge(merge::MergeArgs),
    /// List or resolve cross-role authorization requests.
    Authorize(authorize::AuthorizeArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => run::handle(args).await,
        Commands::Queue(args) => queue::handle(args).await,
        Commands::Scheduler(args) => scheduler::handle(args).await,
        Commands::Merge(args) => merge::handle(args).await,
        Commands::Authorize(args) => authorize::handle(args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        let code = err.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(4);
        std::process::exit(code);
    }
}
